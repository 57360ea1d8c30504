//! File-backed tracing setup.
//!
//! The host launches plugins without a console, so logs go to a file under
//! the user data directory. `RUST_LOG` overrides the default filter.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber, appending to
/// `<data dir>/<plugin name>/plugin.log`. Returns the log path so the
/// caller can surface it.
pub fn init(plugin_name: &str) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(plugin_name);
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("plugin.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    Ok(log_path)
}
