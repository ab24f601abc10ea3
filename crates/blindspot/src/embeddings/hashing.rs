//! Signed feature-hashing embedder
//!
//! Lower-cased alphanumeric tokens are hashed with FNV-1a into a fixed
//! number of buckets. The top bit of the hash picks the sign so unrelated
//! collisions tend to cancel out. The result is L2-normalized, which makes
//! cosine distance meaningful between any two texts.

use anyhow::{anyhow, Result};

use super::{normalize_embedding, Embedder};

pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
  dimension: usize,
}

impl HashingEmbedder {
  pub fn new(dimension: usize) -> Result<Self> {
    if dimension == 0 {
      return Err(anyhow!("hashing embedder dimension must be at least 1"));
    }
    Ok(Self { dimension })
  }
}

impl Default for HashingEmbedder {
  fn default() -> Self {
    Self { dimension: DEFAULT_DIMENSION }
  }
}

impl Embedder for HashingEmbedder {
  fn dimension(&self) -> usize {
    self.dimension
  }

  fn model_name(&self) -> &str {
    "fnv1a-feature-hashing"
  }

  fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let mut embedding = vec![0.0f32; self.dimension];

    for token in tokenize(text) {
      let hash = fnv1a(token.as_bytes());
      let bucket = (hash % self.dimension as u64) as usize;
      let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
      embedding[bucket] += sign;
    }

    Ok(normalize_embedding(embedding))
  }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|token| !token.is_empty())
    .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
  bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>()
  }

  #[test]
  fn test_fnv1a_reference_values() {
    assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
    assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
  }

  #[test]
  fn test_embed_is_deterministic_and_normalized() {
    let embedder = HashingEmbedder::default();
    let first = embedder.embed("Comparative Advantage: gains from trade").unwrap();
    let second = embedder.embed("Comparative Advantage: gains from trade").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), DEFAULT_DIMENSION);
    let norm: f32 = first.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
  }

  #[test]
  fn test_embed_ignores_case_and_punctuation() {
    let embedder = HashingEmbedder::new(128).unwrap();
    assert_eq!(
      embedder.embed("Economics, Trade").unwrap(),
      embedder.embed("economics trade").unwrap()
    );
  }

  #[test]
  fn test_shared_tokens_are_closer() {
    let embedder = HashingEmbedder::default();
    let query = embedder.embed("Economics, Trade").unwrap();
    let related = embedder.embed("Trade policy (Domain: Economics)").unwrap();
    let unrelated = embedder.embed("Hormesis (Domain: Biology)").unwrap();

    assert!(cosine_distance(&query, &related) < cosine_distance(&query, &unrelated));
  }

  #[test]
  fn test_empty_text_yields_zero_vector() {
    let embedder = HashingEmbedder::new(8).unwrap();
    assert_eq!(embedder.embed(" ,;- ").unwrap(), vec![0.0; 8]);
  }

  #[test]
  fn test_zero_dimension_rejected() {
    assert!(HashingEmbedder::new(0).is_err());
  }
}
