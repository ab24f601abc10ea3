//! Database connection management for LanceDB

use anyhow::{anyhow, Context, Result};
use lancedb::{connect, Connection};
use std::path::Path;

/// Create a LanceDB connection, creating the data directory if needed
pub async fn create_connection(data_dir: &Path) -> Result<Connection> {
  ensure_data_directory_exists(data_dir)?;

  connect(&data_dir.to_string_lossy())
    .execute()
    .await
    .map_err(|e| anyhow!("Failed to connect to LanceDB at {}: {}", data_dir.display(), e))
}

fn ensure_data_directory_exists(data_dir: &Path) -> Result<()> {
  std::fs::create_dir_all(data_dir)
    .with_context(|| format!("Failed to create data directory {}", data_dir.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_directory_creation_is_idempotent() {
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");

    ensure_data_directory_exists(&nested).unwrap();
    ensure_data_directory_exists(&nested).unwrap();
    assert!(nested.is_dir());
  }
}
