use std::path::{Path, PathBuf};

use tracing::info;

use recital_core::error::{RecitalError, Result};

use crate::segment::segment;

/// The UTF-8 text file the sentence list is built from.
///
/// Read from scratch on every [`load`](Self::load); nothing is cached so an
/// edit made while the session runs is picked up by the next reload.
#[derive(Debug, Clone)]
pub struct SentenceSource {
    path: PathBuf,
}

impl SentenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and segment the file.
    ///
    /// A missing or non-UTF-8 file is an [`RecitalError::Input`]; a file with
    /// no sentences is [`RecitalError::EmptyInput`].
    pub fn load(&self) -> Result<Vec<String>> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                RecitalError::Input(format!("'{}' not found", self.path.display()))
            }
            _ => RecitalError::Input(format!("cannot read '{}': {}", self.path.display(), e)),
        })?;

        let text = String::from_utf8(bytes).map_err(|e| {
            RecitalError::Input(format!(
                "'{}' is not valid UTF-8 (byte {})",
                self.path.display(),
                e.utf8_error().valid_up_to()
            ))
        })?;

        let sentences = segment(&text)?;
        info!(
            path = %self.path.display(),
            count = sentences.len(),
            "Sentences loaded"
        );
        Ok(sentences)
    }
}
