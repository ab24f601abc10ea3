use anyhow::Result;
use clap::Parser;

use blindspot::cli::{self, Cli};
use blindspot::logging;

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init(cli.verbose);

  cli::run(cli).await
}
