use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Filter directive used when RUST_LOG is not set.
fn default_directive(config: &LogConfig, verbose: bool) -> String {
  if verbose {
    "debug".to_string()
  } else {
    config.level.clone()
  }
}

/// Install the global subscriber: stderr always, plus a log file when configured.
///
/// The returned guard flushes the file writer on drop and must be held by `main`.
pub fn init(config: &LogConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_directive(config, verbose)))
    .map_err(|e| eyre!("Invalid log filter '{}': {}", config.level, e))?;

  let stderr_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .compact();

  let (file_layer, guard) = match &config.file {
    Some(path) => {
      let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
      let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Log file path has no file name: {}", path.display()))?;

      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

      let appender = tracing_appender::rolling::never(dir, file_name);
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer().with_writer(writer).with_ansi(false);
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(stderr_layer)
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_verbose_overrides_configured_level() {
    let config = LogConfig {
      level: "warn".to_string(),
      file: None,
    };
    assert_eq!(default_directive(&config, false), "warn");
    assert_eq!(default_directive(&config, true), "debug");
  }

  #[test]
  fn test_configured_directive_parses() {
    let config = LogConfig {
      level: "swcache=debug,reqwest=warn".to_string(),
      file: None,
    };
    assert!(EnvFilter::try_new(default_directive(&config, false)).is_ok());
  }
}
