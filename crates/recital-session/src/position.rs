//! Persisted cursor position.
//!
//! The position lives in a small JSON settings document next to whatever
//! other keys the operator keeps there. Only one key is load-bearing; every
//! other key is carried through rewrites untouched.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, warn};

use recital_core::error::Result;

/// Canonical key holding the last processed sentence (0-based).
pub const POSITION_KEY: &str = "last_processed_sentence";

/// Key used by older settings documents. Migrated to [`POSITION_KEY`] on load.
pub const LEGACY_POSITION_KEY: &str = "last_processed_paragraph";

/// Loads and saves the last processed sentence index.
#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted position.
    ///
    /// A missing, unreadable or unparsable document yields 0 and is rewritten
    /// with 0 straight away. A document that only carries the legacy key is
    /// migrated and rewritten before the value is returned.
    pub fn load(&self) -> Result<usize> {
        let Some(mut document) = self.read_document() else {
            let mut document = Map::new();
            document.insert(POSITION_KEY.to_string(), Value::from(0u64));
            self.write_document(&document)?;
            return Ok(0);
        };

        let mut dirty = false;
        if let Some(legacy) = document.remove(LEGACY_POSITION_KEY) {
            dirty = true;
            if !document.contains_key(POSITION_KEY) {
                info!(
                    path = %self.path.display(),
                    "Migrating '{}' to '{}'", LEGACY_POSITION_KEY, POSITION_KEY
                );
                document.insert(POSITION_KEY.to_string(), legacy);
            }
        }

        let position = match document.get(POSITION_KEY).and_then(as_position) {
            Some(position) => position,
            None => {
                warn!(
                    path = %self.path.display(),
                    "Settings document has no usable '{}', resetting to 0", POSITION_KEY
                );
                document.insert(POSITION_KEY.to_string(), Value::from(0u64));
                dirty = true;
                0
            }
        };

        if dirty {
            self.write_document(&document)?;
        }
        Ok(position)
    }

    /// Persist `position` under the canonical key, keeping unrelated keys.
    pub fn save(&self, position: usize) -> Result<()> {
        let mut document = self.read_document().unwrap_or_default();
        document.remove(LEGACY_POSITION_KEY);
        document.insert(POSITION_KEY.to_string(), Value::from(position as u64));
        self.write_document(&document)?;
        info!(position, path = %self.path.display(), "Position saved");
        Ok(())
    }

    /// `None` when the file is absent, unreadable or not a JSON object.
    fn read_document(&self) -> Option<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read settings");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Settings document is not a JSON object");
                None
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(document, &mut ser)?;
        std::fs::write(&self.path, buf)?;
        Ok(())
    }
}

fn as_position(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> PositionStore {
        PositionStore::new(dir.path().join("settings.json"))
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_document_is_created_with_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load().unwrap(), 0);
        assert_eq!(read_json(store.path()), serde_json::json!({ POSITION_KEY: 0 }));
    }

    #[test]
    fn test_empty_document_is_reset_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();

        assert_eq!(store.load().unwrap(), 0);
        assert_eq!(read_json(store.path())[POSITION_KEY], 0);
    }

    #[test]
    fn test_corrupt_document_is_reset_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load().unwrap(), 0);
        assert_eq!(read_json(store.path())[POSITION_KEY], 0);
    }

    #[test]
    fn test_non_object_document_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "[1, 2, 3]").unwrap();

        assert_eq!(store.load().unwrap(), 0);
        assert!(read_json(store.path()).is_object());
    }

    #[test]
    fn test_load_existing_position() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"last_processed_sentence": 42}"#).unwrap();

        assert_eq!(store.load().unwrap(), 42);
    }

    #[test]
    fn test_legacy_key_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"last_processed_paragraph": 17}"#).unwrap();

        assert_eq!(store.load().unwrap(), 17);

        let doc = read_json(store.path());
        assert_eq!(doc[POSITION_KEY], 17);
        assert!(doc.get(LEGACY_POSITION_KEY).is_none());
    }

    #[test]
    fn test_legacy_key_absent_after_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"last_processed_paragraph": 5}"#).unwrap();

        let position = store.load().unwrap();
        store.save(position).unwrap();

        assert_eq!(read_json(store.path()), serde_json::json!({ POSITION_KEY: 5 }));
    }

    #[test]
    fn test_canonical_wins_over_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"last_processed_sentence": 3, "last_processed_paragraph": 9}"#,
        )
        .unwrap();

        assert_eq!(store.load().unwrap(), 3);
        let doc = read_json(store.path());
        assert_eq!(doc[POSITION_KEY], 3);
        assert!(doc.get(LEGACY_POSITION_KEY).is_none());
    }

    #[test]
    fn test_invalid_position_value_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for bad in [r#""seven""#, "-4", "2.5", "null"] {
            std::fs::write(store.path(), format!(r#"{{"last_processed_sentence": {bad}}}"#))
                .unwrap();
            assert_eq!(store.load().unwrap(), 0, "value {bad}");
            assert_eq!(read_json(store.path())[POSITION_KEY], 0);
        }
    }

    #[test]
    fn test_unknown_keys_survive_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"last_processed_paragraph": 2, "theme": "dark", "volume": 7}"#,
        )
        .unwrap();

        assert_eq!(store.load().unwrap(), 2);
        store.save(11).unwrap();

        let doc = read_json(store.path());
        assert_eq!(doc[POSITION_KEY], 11);
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc["volume"], 7);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(8).unwrap();
        assert_eq!(store.load().unwrap(), 8);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("a").join("b").join("settings.json"));

        store.save(1).unwrap();
        assert_eq!(store.load().unwrap(), 1);
    }

    #[test]
    fn test_document_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(4).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "{\n    \"last_processed_sentence\": 4\n}");
    }
}
