//! Subscriber setup from the build's logging options.

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result};
use cadb_lib::config::{LogTarget, LoggingConfig};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Build a dispatcher for `config`. `RUST_LOG` overrides the configured level.
pub fn dispatch(config: &LoggingConfig) -> Result<Dispatch> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

  match config.target {
    LogTarget::Console => {
      let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
      Ok(Dispatch::new(subscriber))
    }
    LogTarget::File => {
      let path = config
        .path
        .as_ref()
        .context("logging target 'file' requires options.logging.path")?;

      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create log directory {}", parent.display()))?;
      }

      let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

      let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
      Ok(Dispatch::new(subscriber))
    }
  }
}
