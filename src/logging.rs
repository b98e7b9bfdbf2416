use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Io(#[from] io::Error),
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Routes `tracing` output to an append-only file; the terminal belongs to
/// the TUI. Only the first successful call installs a subscriber.
pub fn init_file_logging(path: &Path, level: Level) -> Result<(), LoggingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}
