mod app;
mod cache;
mod config;
mod logging;
mod net;
mod worker;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::time::Duration;

use cache::{MemoryStorage, SqliteStorage};
use net::HttpNetwork;

#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(about = "Offline-first request router with versioned response caches")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/swcache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Log at debug level (RUST_LOG takes precedence)
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: app::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log, args.verbose)?;

  let network = HttpNetwork::new(Duration::from_secs(config.network.timeout_secs))?;

  if config.cache.persist {
    let storage = SqliteStorage::open(config.cache.path.as_deref())?;
    app::App::new(&config, storage, network)?
      .run(args.command)
      .await
  } else {
    app::App::new(&config, MemoryStorage::new(), network)?
      .run(args.command)
      .await
  }
}
