use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::cli::display::{display_alternatives, display_concept, display_neighbours};
use crate::config::Config;
use crate::ingest::IngestionPipeline;
use crate::ranker::NoveltyRanker;

/// Ingest a corpus file into the configured store
pub async fn ingest(config: &Config, file: &Path) -> Result<()> {
  let store = config.open_store().await?;
  let written = IngestionPipeline::new(&store).ingest_file(file).await?;
  let total = store.count().await?;
  store.close();

  println!(
    "{} Ingested {} concepts from {} ({} stored)",
    "✓".green(),
    written.to_string().cyan(),
    file.display().to_string().yellow(),
    total
  );
  Ok(())
}

/// Print the blindspot concept for `topics`, plus optional runners-up
pub async fn find(config: &Config, topics: &[String], alternatives: usize) -> Result<()> {
  let store = config.open_store().await?;
  let ranked = NoveltyRanker::new(&store).ranked_window(topics, config.window).await?;
  store.close();

  let Some((best, rest)) = ranked.split_first() else {
    println!("No concepts stored yet. Run {} first.", "blindspot ingest <FILE>".cyan());
    return Ok(());
  };

  display_concept(&best.concept, Some(best.distance));
  if alternatives > 0 {
    display_alternatives(&rest[..alternatives.min(rest.len())]);
  }
  Ok(())
}

/// Print the nearest stored concepts to `text`
pub async fn query(config: &Config, text: &str, k: usize) -> Result<()> {
  let store = config.open_store().await?;
  let results = store.query(text, k).await?;
  let total = store.count().await?;
  store.close();

  if total == 0 {
    println!("No concepts stored yet. Run {} first.", "blindspot ingest <FILE>".cyan());
    return Ok(());
  }

  display_neighbours(&results);
  Ok(())
}

pub async fn count(config: &Config) -> Result<()> {
  let store = config.open_store().await?;
  let total = store.count().await?;
  store.close();

  println!("{} concepts stored in {}", total.to_string().cyan(), config.data_dir.display());
  Ok(())
}
