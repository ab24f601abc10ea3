//! LanceDB-backed concept index
//!
//! Rows live in a single table keyed by concept name. Writes go through a
//! merge-insert on `id`, so a batch lands as one commit and existing rows
//! are replaced rather than duplicated. Writes through one handle are
//! serialised; readers always see a committed version.

pub mod connection;
pub mod records;
pub mod search;
pub mod table_manager;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::store::index::{ConceptIndex, IndexedConcept, QueryResult};
use connection::create_connection;
use search::search_nearest_concepts;
use table_manager::TableManager;

pub const DEFAULT_TABLE_NAME: &str = "concepts";

pub struct LanceConceptIndex {
  table_manager: TableManager,
}

impl LanceConceptIndex {
  /// Open the index stored under `data_dir`, creating it if needed
  pub async fn open(data_dir: &Path, table_name: &str, dimension: usize) -> Result<Self> {
    let connection = create_connection(data_dir).await?;
    let table_manager = TableManager::open_or_create(&connection, table_name, dimension).await?;
    Ok(Self { table_manager })
  }
}

#[async_trait]
impl ConceptIndex for LanceConceptIndex {
  fn dimension(&self) -> usize {
    self.table_manager.dimension()
  }

  async fn upsert(&self, records: Vec<IndexedConcept>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }
    self.table_manager.upsert_records(&records).await
  }

  async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<QueryResult>> {
    if limit == 0 {
      return Ok(Vec::new());
    }
    search_nearest_concepts(self.table_manager.table(), embedding, limit).await
  }

  async fn count(&self) -> Result<usize> {
    self.table_manager.count_rows().await
  }
}
