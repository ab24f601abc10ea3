//! Runtime configuration
//!
//! Resolved once at startup. The embedding backend in particular is chosen
//! here and never re-evaluated per request.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::embeddings::{self, hashing, EmbedderKind};
use crate::error::BlindspotError;
use crate::ranker::DEFAULT_WINDOW;
use crate::store::lancedb::DEFAULT_TABLE_NAME;
use crate::store::ConceptStore;

pub const ROOT_ENV: &str = "BLINDSPOT_ROOT";
pub const TABLE_ENV: &str = "BLINDSPOT_TABLE";
pub const EMBEDDER_ENV: &str = "BLINDSPOT_EMBEDDER";
pub const WINDOW_ENV: &str = "BLINDSPOT_WINDOW";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Directory holding the durable index
  pub data_dir: PathBuf,
  pub table_name: String,
  pub embedder: EmbedderKind,
  /// Only used by the hashing backend
  pub hashing_dimension: usize,
  pub window: usize,
}

impl Config {
  /// Defaults rooted at `data_dir`
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    Self {
      data_dir: data_dir.into(),
      table_name: DEFAULT_TABLE_NAME.to_string(),
      embedder: EmbedderKind::default(),
      hashing_dimension: hashing::DEFAULT_DIMENSION,
      window: DEFAULT_WINDOW,
    }
  }

  /// Build the embedder and open the store this configuration points at
  pub async fn open_store(&self) -> Result<ConceptStore, BlindspotError> {
    let embedder = embeddings::create_embedder(self.embedder, self.hashing_dimension)
      .await
      .map_err(BlindspotError::embedding)?;
    ConceptStore::open(&self.data_dir, &self.table_name, embedder).await
  }
}

/// Default index location: `~/.blindspot/concepts`
pub fn default_data_dir() -> Result<PathBuf> {
  let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
  Ok(home.join(".blindspot").join("concepts"))
}
