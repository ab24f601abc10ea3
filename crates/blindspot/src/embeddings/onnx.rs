use anyhow::{anyhow, Result};
use hf_hub::api::tokio::Api;
use ndarray::Array2;
use ort::{session::Session, value::Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokenizers::Tokenizer;

use super::{normalize_embedding, Embedder};

const MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";
const TOKENIZER_FILE: &str = "tokenizer.json";
const MODEL_FILE: &str = "onnx/model.onnx";
const EMBEDDING_DIMENSION: usize = 384;

/// all-MiniLM-L6-v2 sentence embeddings through ONNX Runtime
pub struct OnnxEmbedder {
  session: Mutex<Session>,
  tokenizer: Tokenizer,
  input_names: Vec<String>,
}

struct ModelFiles {
  tokenizer_file: PathBuf,
  model_path: PathBuf,
}

// Model initialization
#[cfg(not(tarpaulin_include))]
impl OnnxEmbedder {
  /// Download (or reuse the cached) model files and build a session
  pub async fn load() -> Result<Self> {
    tracing::info!(model = MODEL_NAME, "loading embedding model");

    let files = Self::download_model().await?;
    let tokenizer = Tokenizer::from_file(files.tokenizer_file)
      .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
    let session = Session::builder()?.commit_from_file(files.model_path)?;
    let input_names = session.inputs.iter().map(|input| input.name.to_string()).collect();

    tracing::info!(model = MODEL_NAME, "embedding model loaded");
    Ok(Self { session: Mutex::new(session), tokenizer, input_names })
  }

  async fn download_model() -> Result<ModelFiles> {
    let api = Api::new().map_err(|e| anyhow!("HF API initialization failed: {}", e))?;
    let repo = api.model(MODEL_NAME.to_string());

    let tokenizer_file =
      repo.get(TOKENIZER_FILE).await.map_err(|e| anyhow!("Failed to download tokenizer: {}", e))?;
    let model_path =
      repo.get(MODEL_FILE).await.map_err(|e| anyhow!("Failed to download ONNX model: {}", e))?;

    Ok(ModelFiles { tokenizer_file, model_path })
  }
}

impl Embedder for OnnxEmbedder {
  fn dimension(&self) -> usize {
    EMBEDDING_DIMENSION
  }

  fn model_name(&self) -> &str {
    MODEL_NAME
  }

  fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let encoding =
      self.tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let attention_mask = encoding.get_attention_mask().to_vec();
    let inputs = self.prepare(&encoding)?;

    let mut session =
      self.session.lock().map_err(|_| anyhow!("embedding session lock poisoned"))?;
    let outputs = session.run(inputs)?;

    let tensor = outputs
      .get("last_hidden_state")
      .or_else(|| outputs.get("0"))
      .ok_or_else(|| anyhow!("No output found from model - expected 'last_hidden_state' or '0'"))?;
    let (shape, data) = tensor.try_extract_tensor::<f32>()?;

    let pooled = mean_pool(shape.as_ref(), data, &attention_mask)?;
    Ok(normalize_embedding(pooled))
  }
}

impl OnnxEmbedder {
  fn prepare(&self, encoding: &tokenizers::Encoding) -> Result<HashMap<String, Value>> {
    let mut inputs = HashMap::new();
    inputs.insert("input_ids".to_string(), to_tensor(encoding.get_ids())?);
    inputs.insert("attention_mask".to_string(), to_tensor(encoding.get_attention_mask())?);

    if self.input_names.iter().any(|name| name == "token_type_ids") {
      inputs.insert("token_type_ids".to_string(), to_tensor(encoding.get_type_ids())?);
    }

    Ok(inputs)
  }
}

fn to_tensor(values: &[u32]) -> Result<Value> {
  let ids: Vec<i64> = values.iter().map(|&x| x as i64).collect();
  let array: Array2<i64> = Array2::from_shape_vec((1, ids.len()), ids)?;
  let tensor: Value = Value::from_array(array)?.into();
  Ok(tensor)
}

/// Mean-pool a `[1, seq_len, hidden]` hidden state over unmasked tokens
fn mean_pool(shape: &[i64], data: &[f32], attention_mask: &[u32]) -> Result<Vec<f32>> {
  if shape.len() != 3 {
    return Err(anyhow!("expected a rank-3 hidden state, got shape {:?}", shape));
  }

  let seq_length = shape[1] as usize;
  let hidden_size = shape[2] as usize;
  if data.len() < seq_length * hidden_size {
    return Err(anyhow!("hidden state holds {} values, shape {:?} needs more", data.len(), shape));
  }

  let mut pooled = vec![0.0f32; hidden_size];
  let mut counted = 0usize;
  for token_idx in 0..seq_length {
    if attention_mask.get(token_idx).copied().unwrap_or(1) == 0 {
      continue;
    }
    let start = token_idx * hidden_size;
    for (i, &value) in data[start..start + hidden_size].iter().enumerate() {
      pooled[i] += value;
    }
    counted += 1;
  }

  if counted > 0 {
    for value in pooled.iter_mut() {
      *value /= counted as f32;
    }
  }

  Ok(pooled)
}
