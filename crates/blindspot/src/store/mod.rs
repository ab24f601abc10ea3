//! Durable concept store: embedding plus keyed vector index
//!
//! The store computes each concept's derived text, embeds it and hands the
//! vectors to the index. Query text goes through the same embedder, so
//! distances are always between vectors of one model.

pub mod index;
pub mod lancedb;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::concept::Concept;
use crate::embeddings::Embedder;
use crate::error::{BlindspotError, Result, ValidationError};
pub use index::{ConceptIndex, IndexedConcept, QueryResult};
use self::lancedb::LanceConceptIndex;

/// Extra rows fetched beyond `k` so ties at the boundary are seen
const TIE_MARGIN: usize = 8;

pub struct ConceptStore {
  embedder: Arc<dyn Embedder>,
  index: Box<dyn ConceptIndex>,
}

impl ConceptStore {
  /// Open the durable index at `location`, or create an empty one there
  pub async fn open(
    location: impl AsRef<Path>,
    table_name: &str,
    embedder: Arc<dyn Embedder>,
  ) -> Result<Self> {
    let location = location.as_ref();
    let index = LanceConceptIndex::open(location, table_name, embedder.dimension())
      .await
      .map_err(BlindspotError::persistence)?;

    tracing::info!(
      location = %location.display(),
      table = table_name,
      model = embedder.model_name(),
      "concept store ready"
    );
    Self::with_index(embedder, Box::new(index))
  }

  /// Wrap an already opened index
  pub fn with_index(embedder: Arc<dyn Embedder>, index: Box<dyn ConceptIndex>) -> Result<Self> {
    if embedder.dimension() != index.dimension() {
      return Err(BlindspotError::persistence(anyhow::anyhow!(
        "index expects {}-dimensional embeddings but '{}' produces {}",
        index.dimension(),
        embedder.model_name(),
        embedder.dimension()
      )));
    }
    Ok(Self { embedder, index })
  }

  pub fn embedder(&self) -> &dyn Embedder {
    self.embedder.as_ref()
  }

  /// Insert or fully replace each concept, keyed by name.
  ///
  /// Every embedding is computed before the index is touched, so an
  /// embedding failure leaves the store as it was. When a name repeats
  /// within `concepts`, the last occurrence wins. Returns the number of
  /// distinct concepts written.
  pub async fn upsert(&self, concepts: &[Concept]) -> Result<usize> {
    let concepts = last_occurrence_per_name(concepts);
    if concepts.is_empty() {
      return Ok(0);
    }

    let mut records = Vec::with_capacity(concepts.len());
    for concept in concepts {
      let embedding = self.embed(&concept.embedding_text())?;
      records.push(IndexedConcept { concept: concept.clone(), embedding });
    }

    let written = records.len();
    self.index.upsert(records).await.map_err(BlindspotError::persistence)?;
    tracing::info!(concepts = written, "upserted concepts");
    Ok(written)
  }

  /// Up to `min(k, count)` nearest concepts to `query_text`, closest first.
  /// Equal distances are ordered by id, including ties that straddle the
  /// k-th place, so the selection never depends on the index's scan order.
  pub async fn query(&self, query_text: &str, k: usize) -> Result<Vec<QueryResult>> {
    if k == 0 {
      return Ok(Vec::new());
    }

    let embedding = self.embed(query_text)?;
    if embedding.iter().all(|value| *value == 0.0) {
      return Err(ValidationError::EmptyQuery.into());
    }

    let total = self.count().await?;
    if total == 0 {
      return Ok(Vec::new());
    }

    let k = k.min(total);
    let mut limit = (k + TIE_MARGIN).min(total);
    loop {
      let mut results =
        self.index.nearest(&embedding, limit).await.map_err(BlindspotError::persistence)?;
      sort_closest_first(&mut results);

      if limit < total && results.len() == limit && tie_reaches_last_row(&results, k) {
        limit = (limit * 2).min(total);
        tracing::debug!(k, limit, "tie at the window boundary, widening search");
        continue;
      }

      results.truncate(k);
      tracing::debug!(k, returned = results.len(), "queried concept store");
      return Ok(results);
    }
  }

  pub async fn count(&self) -> Result<usize> {
    self.index.count().await.map_err(BlindspotError::persistence)
  }

  /// Release the index handles. Dropping the store does the same; this just
  /// makes the teardown point explicit.
  pub fn close(self) {
    let Self { embedder, index } = self;
    drop(index);
    tracing::debug!(model = embedder.model_name(), "closed concept store");
  }

  fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let embedding = self.embedder.embed(text).map_err(BlindspotError::embedding)?;
    if embedding.len() != self.embedder.dimension() {
      return Err(BlindspotError::embedding(anyhow::anyhow!(
        "'{}' returned {} values, expected {}",
        self.embedder.model_name(),
        embedding.len(),
        self.embedder.dimension()
      )));
    }
    Ok(embedding)
  }
}

fn last_occurrence_per_name(concepts: &[Concept]) -> Vec<&Concept> {
  let last_index: HashMap<&str, usize> =
    concepts.iter().enumerate().map(|(i, c)| (c.name.as_str(), i)).collect();

  concepts
    .iter()
    .enumerate()
    .filter(|(i, c)| last_index.get(c.name.as_str()) == Some(i))
    .map(|(_, c)| c)
    .collect()
}

/// Whether the farthest fetched row is as close as the k-th one, meaning
/// rows beyond the fetch limit could still tie for a place in the top k
fn tie_reaches_last_row(sorted: &[QueryResult], k: usize) -> bool {
  match (sorted.get(k - 1), sorted.last()) {
    (Some(kth), Some(last)) => last.distance.total_cmp(&kth.distance).is_eq(),
    _ => false,
  }
}

fn sort_closest_first(results: &mut [QueryResult]) {
  results.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));
}
