//! Audio artifact bookkeeping.
//!
//! Artifacts are named by the 1-based sentence number, zero-padded to three
//! digits: sentence index 0 lives in `001.<ext>`. Presence on disk is the only
//! state; it is checked fresh on every call.

use std::path::{Path, PathBuf};

use tracing::info;

use recital_core::error::Result;

#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
    extension: String,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for the sentence at `index` (0-based).
    pub fn file_name(&self, index: usize) -> String {
        format!("{:03}.{}", index + 1, self.extension)
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(self.file_name(index))
    }

    /// Whether an artifact for `index` is on disk right now.
    pub fn exists(&self, index: usize) -> bool {
        self.path_for(index).is_file()
    }

    /// Write `audio` as the artifact for `index`, creating the directory on
    /// demand. Returns the path written.
    pub fn write(&self, index: usize, audio: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(index);
        std::fs::write(&path, audio)?;
        info!(path = %path.display(), bytes = audio.len(), "Audio saved");
        Ok(path)
    }
}
