#![allow(dead_code)]

use anyhow::{anyhow, Result};
use blindspot::{ConceptStore, Embedder, HashingEmbedder};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Maps the text before the first ':' to a unit vector at a fixed angle.
/// Concept texts start with "{name}:", query texts are looked up whole.
pub struct AngleEmbedder {
  angles: HashMap<String, f32>,
}

impl AngleEmbedder {
  pub fn new(angles: &[(&str, f32)]) -> Self {
    Self { angles: angles.iter().map(|(key, degrees)| (key.to_string(), *degrees)).collect() }
  }
}

impl Embedder for AngleEmbedder {
  fn dimension(&self) -> usize {
    2
  }

  fn model_name(&self) -> &str {
    "angle-table"
  }

  fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let key = text.split(':').next().unwrap_or(text).trim();
    let degrees = self.angles.get(key).ok_or_else(|| anyhow!("no angle for '{key}'"))?;
    let radians = degrees.to_radians();
    Ok(vec![radians.cos(), radians.sin()])
  }
}

pub fn record(name: &str, domain: &str, explanation: &str, utility: i64) -> Value {
  json!({ "name": name, "domain": domain, "explanation": explanation, "utility": utility })
}

pub fn economics_corpus() -> Vec<Value> {
  vec![
    record("Pareto Principle", "Economics", "Roughly 80% of effects come from 20% of causes.", 9),
    record(
      "Hormesis",
      "Biology",
      "A beneficial response of an organism to low exposure to stressors or toxins.",
      8,
    ),
    record(
      "Comparative Advantage",
      "Economics",
      "Parties gain from trade by specializing in goods they produce at a lower opportunity cost.",
      9,
    ),
  ]
}

pub fn topics(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

pub async fn open_hashing_store(location: &Path) -> ConceptStore {
  ConceptStore::open(location, "concepts", Arc::new(HashingEmbedder::default())).await.unwrap()
}

pub async fn open_store_with(location: &Path, embedder: impl Embedder + 'static) -> ConceptStore {
  ConceptStore::open(location, "concepts", Arc::new(embedder)).await.unwrap()
}
