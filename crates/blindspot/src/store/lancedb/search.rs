//! Vector search operations and result processing for LanceDB

use anyhow::{anyhow, Result};
use arrow::array::{Array, Float32Array, Int32Array, StringArray};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};

use super::records::{
  DOMAIN_COLUMN, EMBEDDING_COLUMN, EXPLANATION_COLUMN, ID_COLUMN, NAME_COLUMN, UTILITY_COLUMN,
};
use crate::concept::Concept;
use crate::store::index::QueryResult;

const DISTANCE_COLUMN: &str = "_distance";

/// Cosine-distance nearest neighbour search over the embedding column
pub async fn search_nearest_concepts(
  table: &Table,
  query_embedding: &[f32],
  limit: usize,
) -> Result<Vec<QueryResult>> {
  let batches: Vec<RecordBatch> = table
    .vector_search(query_embedding)?
    .column(EMBEDDING_COLUMN)
    .distance_type(DistanceType::Cosine)
    .limit(limit)
    .execute()
    .await
    .map_err(|e| anyhow!("Vector search failed: {}", e))?
    .try_collect()
    .await
    .map_err(|e| anyhow!("Error reading search results: {}", e))?;

  let mut results = Vec::new();
  for batch in &batches {
    results.extend(process_result_batch(batch)?);
  }

  if results.is_empty() {
    tracing::debug!("vector search returned no rows");
  }
  Ok(results)
}

/// Convert one result batch into query results
fn process_result_batch(batch: &RecordBatch) -> Result<Vec<QueryResult>> {
  let columns = BatchColumnArrays::extract(batch)?;
  (0..batch.num_rows()).map(|row| columns.result_at(row)).collect()
}

struct BatchColumnArrays<'a> {
  id_array: &'a StringArray,
  name_array: &'a StringArray,
  domain_array: &'a StringArray,
  explanation_array: &'a StringArray,
  utility_array: &'a Int32Array,
  distance_array: &'a Float32Array,
}

impl<'a> BatchColumnArrays<'a> {
  fn extract(batch: &'a RecordBatch) -> Result<Self> {
    Ok(Self {
      id_array: typed_column(batch, ID_COLUMN)?,
      name_array: typed_column(batch, NAME_COLUMN)?,
      domain_array: typed_column(batch, DOMAIN_COLUMN)?,
      explanation_array: typed_column(batch, EXPLANATION_COLUMN)?,
      utility_array: typed_column(batch, UTILITY_COLUMN)?,
      distance_array: typed_column(batch, DISTANCE_COLUMN)?,
    })
  }

  fn result_at(&self, row: usize) -> Result<QueryResult> {
    if self.distance_array.is_null(row) {
      return Err(anyhow!("search result row {} has no distance", row));
    }

    Ok(QueryResult {
      id: self.id_array.value(row).to_string(),
      distance: self.distance_array.value(row),
      concept: Concept {
        name: self.name_array.value(row).to_string(),
        domain: self.domain_array.value(row).to_string(),
        explanation: self.explanation_array.value(row).to_string(),
        utility: self.utility_array.value(row),
      },
    })
  }
}

fn typed_column<'a, T: Array + 'static>(
  batch: &'a RecordBatch,
  column_name: &str,
) -> Result<&'a T> {
  batch
    .column_by_name(column_name)
    .ok_or_else(|| anyhow!("Missing '{}' column", column_name))?
    .as_any()
    .downcast_ref::<T>()
    .ok_or_else(|| anyhow!("Unexpected type for '{}' column", column_name))
}
