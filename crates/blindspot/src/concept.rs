//! Concept records and their validation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

pub const MIN_UTILITY: i64 = 1;
pub const MAX_UTILITY: i64 = 10;

/// A single corpus entry, keyed by `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
  pub name: String,
  pub domain: String,
  pub explanation: String,
  pub utility: i32,
}

impl Concept {
  pub fn new(
    name: impl Into<String>,
    domain: impl Into<String>,
    explanation: impl Into<String>,
    utility: i32,
  ) -> Self {
    Self {
      name: name.into(),
      domain: domain.into(),
      explanation: explanation.into(),
      utility,
    }
  }

  /// Text fed to the embedder. The template must stay fixed so unchanged
  /// content always maps to the same vector.
  pub fn embedding_text(&self) -> String {
    format!("{}: {} (Domain: {})", self.name, self.explanation, self.domain)
  }
}

/// Validate a raw JSON record at position `index` of a batch
pub fn from_raw(index: usize, raw: &Value) -> Result<Concept, ValidationError> {
  let object = raw
    .as_object()
    .ok_or_else(|| ValidationError::invalid_record(index, None, "expected a JSON object"))?;

  let name = required_string(index, None, object, "name")?;
  if name.trim().is_empty() {
    return Err(ValidationError::invalid_record(index, None, "field 'name' must not be blank"));
  }

  let domain = required_string(index, Some(name), object, "domain")?;
  let explanation = required_string(index, Some(name), object, "explanation")?;
  let utility = required_utility(index, name, object)?;

  Ok(Concept::new(name, domain, explanation, utility))
}

fn required_string<'a>(
  index: usize,
  name: Option<&str>,
  object: &'a Map<String, Value>,
  field: &str,
) -> Result<&'a str, ValidationError> {
  match object.get(field) {
    Some(Value::String(value)) => Ok(value.as_str()),
    Some(other) => Err(ValidationError::invalid_record(
      index,
      name,
      format!("field '{field}' must be a string, found {}", kind_of(other)),
    )),
    None => Err(ValidationError::invalid_record(index, name, format!("missing field '{field}'"))),
  }
}

fn required_utility(
  index: usize,
  name: &str,
  object: &Map<String, Value>,
) -> Result<i32, ValidationError> {
  let value = object.get("utility").ok_or_else(|| {
    ValidationError::invalid_record(index, Some(name), "missing field 'utility'")
  })?;

  let utility = value.as_i64().ok_or_else(|| {
    ValidationError::invalid_record(
      index,
      Some(name),
      format!("field 'utility' must be an integer, found {}", kind_of(value)),
    )
  })?;

  if !(MIN_UTILITY..=MAX_UTILITY).contains(&utility) {
    return Err(ValidationError::invalid_record(
      index,
      Some(name),
      format!("field 'utility' must be between {MIN_UTILITY} and {MAX_UTILITY}, got {utility}"),
    ));
  }

  Ok(utility as i32)
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
