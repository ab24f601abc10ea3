//! Batch ingestion of raw concept records
//!
//! A batch is validated in full before the store sees any of it. One bad
//! record aborts the whole batch and the store stays exactly as it was.

use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::concept::{self, Concept};
use crate::error::{BlindspotError, Result, ValidationError};
use crate::store::ConceptStore;

pub struct IngestionPipeline<'a> {
  store: &'a ConceptStore,
}

impl<'a> IngestionPipeline<'a> {
  pub fn new(store: &'a ConceptStore) -> Self {
    Self { store }
  }

  /// Validate `records` and upsert them as one batch. Returns the number of
  /// concepts written.
  pub async fn ingest(&self, records: &[Value]) -> Result<usize> {
    let concepts = validate_batch(records)?;
    let written = self.store.upsert(&concepts).await?;
    tracing::info!(records = records.len(), written, "ingested concept batch");
    Ok(written)
  }

  /// Ingest a corpus file holding a JSON array of concept records
  pub async fn ingest_file(&self, path: impl AsRef<Path>) -> Result<usize> {
    let records = read_corpus_file(path.as_ref())?;
    self.ingest(&records).await
  }
}

/// Validate every record and reject names repeated within the batch
pub fn validate_batch(records: &[Value]) -> Result<Vec<Concept>, ValidationError> {
  let mut seen = HashSet::new();
  let mut concepts = Vec::with_capacity(records.len());

  for (index, raw) in records.iter().enumerate() {
    let concept = concept::from_raw(index, raw)?;
    if !seen.insert(concept.name.clone()) {
      return Err(ValidationError::invalid_record(
        index,
        Some(concept.name.as_str()),
        "duplicate name within batch",
      ));
    }
    concepts.push(concept);
  }

  Ok(concepts)
}

fn read_corpus_file(path: &Path) -> Result<Vec<Value>> {
  let content = std::fs::read_to_string(path).map_err(|e| {
    BlindspotError::persistence(anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
  })?;

  let parsed: Value = serde_json::from_str(&content).map_err(|e| {
    ValidationError::MalformedCorpus { path: path.display().to_string(), reason: e.to_string() }
  })?;

  match parsed {
    Value::Array(records) => Ok(records),
    _ => Err(ValidationError::NotAnArray { path: path.display().to_string() }.into()),
  }
}
