//! Tracing subscriber setup for the binary

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Install a stderr subscriber. `RUST_LOG` wins when set; otherwise Lance and
/// DataFusion are kept quiet unless `verbose` is on.
pub fn init(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .try_init();
}

fn default_filter(verbose: bool) -> EnvFilter {
  if verbose {
    EnvFilter::new("blindspot=debug,lance=warn,lance_datafusion=warn,datafusion=warn,info")
  } else {
    EnvFilter::new("blindspot=warn,lance=error,lance_datafusion=error,datafusion=error,warn")
  }
}
