//! Table management operations for LanceDB

use anyhow::{anyhow, Result};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchIterator};
use lancedb::{Connection, Table};
use tokio::sync::Mutex;

use super::records::{concept_schema, concepts_to_arrow_batch, schema_dimension, ID_COLUMN};
use crate::store::index::IndexedConcept;

/// Owns the concepts table and its fixed embedding dimension
pub struct TableManager {
  table: Table,
  dimension: usize,
  /// Merge-inserts through this handle commit one at a time
  write_lock: Mutex<()>,
}

impl TableManager {
  /// Open `table_name`, creating an empty table when it does not exist yet
  pub async fn open_or_create(
    connection: &Connection,
    table_name: &str,
    dimension: usize,
  ) -> Result<Self> {
    let table = if table_exists(connection, table_name).await? {
      open_existing_table(connection, table_name, dimension).await?
    } else {
      create_empty_table(connection, table_name, dimension).await?
    };

    Ok(Self { table, dimension, write_lock: Mutex::new(()) })
  }

  pub fn dimension(&self) -> usize {
    self.dimension
  }

  pub fn table(&self) -> &Table {
    &self.table
  }

  /// Keyed merge on `id`: matching rows are replaced wholesale, new ids inserted
  pub async fn upsert_records(&self, records: &[IndexedConcept]) -> Result<()> {
    let batch = concepts_to_arrow_batch(records, self.dimension)?;
    let schema = batch.schema();
    let reader = RecordBatchIterator::new(vec![Ok::<RecordBatch, ArrowError>(batch)], schema);

    let _guard = self.write_lock.lock().await;
    let mut merge = self.table.merge_insert(&[ID_COLUMN]);
    merge.when_matched_update_all(None).when_not_matched_insert_all();
    merge
      .execute(Box::new(reader))
      .await
      .map_err(|e| anyhow!("Failed to upsert {} concepts: {}", records.len(), e))?;

    tracing::debug!(rows = records.len(), "merged concept rows into table");
    Ok(())
  }

  pub async fn count_rows(&self) -> Result<usize> {
    self.table.count_rows(None).await.map_err(|e| anyhow!("Failed to count rows: {}", e))
  }
}

async fn table_exists(connection: &Connection, table_name: &str) -> Result<bool> {
  let tables = connection
    .table_names()
    .execute()
    .await
    .map_err(|e| anyhow!("Failed to list tables: {}", e))?;
  Ok(tables.iter().any(|name| name == table_name))
}

async fn open_existing_table(
  connection: &Connection,
  table_name: &str,
  dimension: usize,
) -> Result<Table> {
  let table = connection
    .open_table(table_name)
    .execute()
    .await
    .map_err(|e| anyhow!("Failed to open table '{}': {}", table_name, e))?;

  let schema = table.schema().await.map_err(|e| anyhow!("Failed to read table schema: {}", e))?;
  let stored_dimension = schema_dimension(&schema)?;
  if stored_dimension != dimension {
    return Err(anyhow!(
      "table '{}' stores {}-dimensional embeddings but the embedder produces {}",
      table_name,
      stored_dimension,
      dimension
    ));
  }

  tracing::debug!(table = table_name, dimension, "opened existing concept table");
  Ok(table)
}

async fn create_empty_table(
  connection: &Connection,
  table_name: &str,
  dimension: usize,
) -> Result<Table> {
  let schema = concept_schema(dimension);
  let reader = RecordBatchIterator::new(Vec::<Result<RecordBatch, ArrowError>>::new(), schema);

  let table = connection
    .create_table(table_name, reader)
    .execute()
    .await
    .map_err(|e| anyhow!("Failed to create table '{}': {}", table_name, e))?;

  tracing::info!(table = table_name, dimension, "created empty concept table");
  Ok(table)
}
