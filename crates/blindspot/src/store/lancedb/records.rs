//! Arrow RecordBatch conversion for concept rows

use anyhow::{anyhow, Result};
use arrow::array::{Array, FixedSizeListBuilder, Float32Builder, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::store::index::IndexedConcept;

pub const ID_COLUMN: &str = "id";
pub const NAME_COLUMN: &str = "name";
pub const DOMAIN_COLUMN: &str = "domain";
pub const EXPLANATION_COLUMN: &str = "explanation";
pub const UTILITY_COLUMN: &str = "utility";
pub const EMBEDDING_COLUMN: &str = "embedding";

/// Arrow schema for the concepts table at a given embedding dimension
pub fn concept_schema(dimension: usize) -> SchemaRef {
  Arc::new(Schema::new(vec![
    Field::new(ID_COLUMN, DataType::Utf8, false),
    Field::new(NAME_COLUMN, DataType::Utf8, false),
    Field::new(DOMAIN_COLUMN, DataType::Utf8, false),
    Field::new(EXPLANATION_COLUMN, DataType::Utf8, false),
    Field::new(UTILITY_COLUMN, DataType::Int32, false),
    Field::new(
      EMBEDDING_COLUMN,
      DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        dimension as i32,
      ),
      false,
    ),
  ]))
}

/// Embedding dimension recorded in an existing table's schema
pub fn schema_dimension(schema: &Schema) -> Result<usize> {
  let field = schema
    .field_with_name(EMBEDDING_COLUMN)
    .map_err(|_| anyhow!("table has no '{}' column", EMBEDDING_COLUMN))?;

  match field.data_type() {
    DataType::FixedSizeList(_, size) => Ok(*size as usize),
    other => Err(anyhow!("'{}' column has unexpected type {}", EMBEDDING_COLUMN, other)),
  }
}

/// Convert indexed concepts into a single RecordBatch
pub fn concepts_to_arrow_batch(
  records: &[IndexedConcept],
  dimension: usize,
) -> Result<RecordBatch> {
  if records.is_empty() {
    return Err(anyhow!("Cannot create RecordBatch from empty records"));
  }

  let columns: Vec<Arc<dyn Array>> = vec![
    Arc::new(string_column(records, |r| r.id())),
    Arc::new(string_column(records, |r| r.concept.name.as_str())),
    Arc::new(string_column(records, |r| r.concept.domain.as_str())),
    Arc::new(string_column(records, |r| r.concept.explanation.as_str())),
    Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.concept.utility))),
    Arc::new(embedding_column(records, dimension)?),
  ];

  RecordBatch::try_new(concept_schema(dimension), columns)
    .map_err(|e| anyhow!("Failed to create RecordBatch: {}", e))
}

fn string_column<F>(records: &[IndexedConcept], field_fn: F) -> StringArray
where
  F: Fn(&IndexedConcept) -> &str,
{
  StringArray::from_iter_values(records.iter().map(field_fn))
}

fn embedding_column(
  records: &[IndexedConcept],
  dimension: usize,
) -> Result<arrow::array::FixedSizeListArray> {
  let mut builder = FixedSizeListBuilder::new(
    Float32Builder::with_capacity(dimension * records.len()),
    dimension as i32,
  );

  for record in records {
    if record.embedding.len() != dimension {
      return Err(anyhow!(
        "embedding for '{}' has {} dimensions, expected {}",
        record.id(),
        record.embedding.len(),
        dimension
      ));
    }
    builder.values().append_slice(&record.embedding);
    builder.append(true);
  }

  Ok(builder.finish())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::concept::Concept;

  fn indexed(name: &str, embedding: Vec<f32>) -> IndexedConcept {
    IndexedConcept { concept: Concept::new(name, "Physics", "An explanation.", 6), embedding }
  }

  #[test]
  fn test_batch_matches_schema() {
    let records =
      vec![indexed("Entropy", vec![1.0, 0.0, 0.0]), indexed("Inertia", vec![0.0, 1.0, 0.0])];
    let batch = concepts_to_arrow_batch(&records, 3).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema(), concept_schema(3));
    assert_eq!(schema_dimension(&batch.schema()).unwrap(), 3);

    let ids =
      batch.column_by_name(ID_COLUMN).unwrap().as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(ids.value(1), "Inertia");
  }

  #[test]
  fn test_batch_rejects_wrong_dimension() {
    let records = vec![indexed("Entropy", vec![1.0, 0.0])];
    let err = concepts_to_arrow_batch(&records, 3).unwrap_err();
    assert!(err.to_string().contains("has 2 dimensions, expected 3"));
  }

  #[test]
  fn test_batch_rejects_empty_input() {
    assert!(concepts_to_arrow_batch(&[], 3).is_err());
  }
}
