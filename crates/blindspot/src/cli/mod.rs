//! Command-line front end

pub mod commands;
pub mod display;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config, EMBEDDER_ENV, ROOT_ENV, TABLE_ENV, WINDOW_ENV};
use crate::embeddings::EmbedderKind;
use crate::ranker::DEFAULT_WINDOW;
use crate::store::lancedb::DEFAULT_TABLE_NAME;

#[derive(Parser)]
#[command(name = "blindspot")]
#[command(
  about = "Blindspot - Concept Novelty Retrieval\nSurface the concept furthest from what you know"
)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Blizz and Kernelle Software"))]
pub struct Cli {
  #[command(flatten)]
  pub store: StoreArgs,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Command,
}

/// Where the concept index lives and how text is embedded
#[derive(Args)]
pub struct StoreArgs {
  /// Directory holding the concept index [default: ~/.blindspot/concepts]
  #[arg(long, env = ROOT_ENV, global = true)]
  pub root: Option<PathBuf>,

  /// Table name inside the index
  #[arg(long, env = TABLE_ENV, default_value = DEFAULT_TABLE_NAME, global = true)]
  pub table: String,

  /// Embedding backend [default: onnx when built with it, otherwise hashing]
  #[arg(long, env = EMBEDDER_ENV, value_enum, global = true)]
  pub embedder: Option<EmbedderKind>,
}

impl StoreArgs {
  pub fn to_config(&self) -> Result<Config> {
    let data_dir = match &self.root {
      Some(root) => root.clone(),
      None => config::default_data_dir()?,
    };

    let mut config = Config::new(data_dir);
    config.table_name = self.table.clone();
    if let Some(embedder) = self.embedder {
      config.embedder = embedder;
    }
    Ok(config)
  }
}

#[derive(Subcommand)]
pub enum Command {
  /// Ingest a JSON array of concept records
  Ingest {
    /// Corpus file with {name, domain, explanation, utility} records
    file: PathBuf,
  },
  /// Suggest the blindspot concept for a set of known topics
  Find {
    /// Topics you already know
    #[arg(required = true)]
    topics: Vec<String>,
    /// Number of nearest concepts considered before inverting the ranking
    #[arg(short, long, env = WINDOW_ENV, default_value_t = DEFAULT_WINDOW)]
    window: usize,
    /// Also show this many runners-up from the window
    #[arg(short, long, default_value_t = 0)]
    alternatives: usize,
  },
  /// Show the nearest concepts to some text
  Query {
    /// Query text (space-separated)
    #[arg(required = true)]
    text: Vec<String>,
    /// Number of neighbours to show
    #[arg(short, default_value_t = 5)]
    k: usize,
  },
  /// Show how many concepts are stored
  Count,
}

pub async fn run(cli: Cli) -> Result<()> {
  let mut config = cli.store.to_config()?;

  match cli.command {
    Command::Ingest { file } => commands::ingest(&config, &file).await,
    Command::Find { topics, window, alternatives } => {
      config.window = window;
      commands::find(&config, &topics, alternatives).await
    }
    Command::Query { text, k } => commands::query(&config, &text.join(" "), k).await,
    Command::Count => commands::count(&config).await,
  }
}
