//! Error taxonomy for the retrieval engine
//!
//! Validation problems are reported before anything touches the store.
//! Backend problems carry the stage that failed so callers can tell an
//! unavailable embedding model apart from a broken index.

use std::fmt;
use thiserror::Error;

pub type Result<T, E = BlindspotError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum BlindspotError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{stage} backend failed: {source}")]
  Backend {
    stage: Stage,
    #[source]
    source: anyhow::Error,
  },
}

impl BlindspotError {
  pub fn embedding(source: impl Into<anyhow::Error>) -> Self {
    Self::Backend { stage: Stage::Embedding, source: source.into() }
  }

  pub fn persistence(source: impl Into<anyhow::Error>) -> Self {
    Self::Backend { stage: Stage::Persistence, source: source.into() }
  }

  /// Stage that failed, if this is a backend error
  pub fn stage(&self) -> Option<Stage> {
    match self {
      Self::Backend { stage, .. } => Some(*stage),
      Self::Validation(_) => None,
    }
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation(_))
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("invalid concept record #{index}{}: {reason}", display_name(.name))]
  InvalidRecord { index: usize, name: Option<String>, reason: String },

  #[error("corpus file {path} must contain a JSON array of concept records")]
  NotAnArray { path: String },

  #[error("corpus file {path} is not valid JSON: {reason}")]
  MalformedCorpus { path: String, reason: String },

  #[error("at least one non-blank known topic is required")]
  EmptyTopics,

  #[error("window must be at least 1")]
  ZeroWindow,

  #[error("query text has no searchable terms")]
  EmptyQuery,
}

impl ValidationError {
  pub fn invalid_record(index: usize, name: Option<&str>, reason: impl Into<String>) -> Self {
    Self::InvalidRecord { index, name: name.map(str::to_string), reason: reason.into() }
  }
}

fn display_name(name: &Option<String>) -> String {
  name.as_deref().map(|n| format!(" ('{n}')")).unwrap_or_default()
}

/// Which backend stage an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Embedding,
  Persistence,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::Embedding => write!(f, "embedding"),
      Stage::Persistence => write!(f, "persistence"),
    }
  }
}
