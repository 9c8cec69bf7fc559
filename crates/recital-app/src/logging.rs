//! Tracing setup.
//!
//! The interactive screen owns stdout, so records go to a log file. If the
//! file cannot be opened only errors are written, to stderr.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where log records ended up.
#[derive(Debug)]
pub enum LogTarget {
    File,
    Stderr(std::io::Error),
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: &str, log_file: &Path) -> LogTarget {
    match open_log_file(log_file) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
                )
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
            LogTarget::File
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("error"))
                .with_writer(std::io::stderr)
                .init();
            LogTarget::Stderr(e)
        }
    }
}

/// Open `path` for appending, creating it and its directory as needed.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
