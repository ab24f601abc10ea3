//! Vector index abstraction behind the concept store
//!
//! The store speaks to a keyed vector index through this trait so the
//! persistence engine can be swapped (or mocked) without touching the
//! embedding and ranking code above it.

use anyhow::Result;
use async_trait::async_trait;

use crate::concept::Concept;

/// A concept paired with the embedding of its derived text
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedConcept {
  pub concept: Concept,
  pub embedding: Vec<f32>,
}

impl IndexedConcept {
  /// Primary key in the index
  pub fn id(&self) -> &str {
    &self.concept.name
  }
}

/// One nearest-neighbour hit. `distance` is cosine distance, smaller is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
  pub id: String,
  pub distance: f32,
  pub concept: Concept,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConceptIndex: Send + Sync {
  /// Embedding length the index was created for
  fn dimension(&self) -> usize;

  /// Insert new ids and fully replace existing ones, as a single commit
  async fn upsert(&self, records: Vec<IndexedConcept>) -> Result<()>;

  /// Up to `limit` nearest rows to `embedding`
  async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<QueryResult>>;

  /// Number of distinct ids stored
  async fn count(&self) -> Result<usize>;
}
