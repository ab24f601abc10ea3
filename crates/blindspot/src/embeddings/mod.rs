//! Pluggable text embedding backends
//!
//! The store only sees the [`Embedder`] trait. Which backend sits behind it
//! is decided once, when the configuration is resolved.

pub mod hashing;
#[cfg(feature = "onnx")]
pub mod onnx;

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

pub use hashing::HashingEmbedder;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;

/// Deterministic text to fixed-length vector mapping
pub trait Embedder: Send + Sync {
  /// Length of every vector returned by [`Embedder::embed`]
  fn dimension(&self) -> usize;

  /// Human-readable backend identifier, used in logs
  fn model_name(&self) -> &str;

  fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmbedderKind {
  /// Feature-hashing embedder, no model download required
  Hashing,
  /// all-MiniLM-L6-v2 via ONNX Runtime
  Onnx,
}

impl Default for EmbedderKind {
  fn default() -> Self {
    if cfg!(feature = "onnx") {
      EmbedderKind::Onnx
    } else {
      EmbedderKind::Hashing
    }
  }
}

impl fmt::Display for EmbedderKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EmbedderKind::Hashing => write!(f, "hashing"),
      EmbedderKind::Onnx => write!(f, "onnx"),
    }
  }
}

/// Build the configured backend
pub async fn create_embedder(
  kind: EmbedderKind,
  hashing_dimension: usize,
) -> Result<Arc<dyn Embedder>> {
  match kind {
    EmbedderKind::Hashing => Ok(Arc::new(HashingEmbedder::new(hashing_dimension)?)),
    EmbedderKind::Onnx => load_onnx().await,
  }
}

#[cfg(feature = "onnx")]
async fn load_onnx() -> Result<Arc<dyn Embedder>> {
  Ok(Arc::new(OnnxEmbedder::load().await?))
}

#[cfg(not(feature = "onnx"))]
async fn load_onnx() -> Result<Arc<dyn Embedder>> {
  Err(anyhow::anyhow!("the onnx embedder is not available: rebuild with `--features onnx`"))
}

/// Normalize embedding vector to unit length for consistent similarity comparisons
pub fn normalize_embedding(mut embedding: Vec<f32>) -> Vec<f32> {
  let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude < f32::EPSILON {
    tracing::debug!("zero-magnitude embedding left unnormalized");
    return embedding;
  }

  for value in embedding.iter_mut() {
    *value /= magnitude;
  }

  embedding
}
