//! Typed whole-file JSON stores
//!
//! Every persisted collection in a workspace is one JSON file read and
//! rewritten in full. [`JsonDocument`] wraps a single file with a typed
//! load/save pair; [`LoadOutcome`] keeps "missing" and "corrupt" apart so
//! callers can decide how lenient to be.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Result of loading a stored document
///
/// Historically both `Missing` and `Corrupt` were collapsed to "empty" at
/// every read site. [`LoadOutcome::or_empty`] preserves that behavior;
/// callers that care can match on the variants instead.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    /// File existed and parsed
    Loaded(T),
    /// File does not exist (legitimately empty)
    Missing,
    /// File exists but is unreadable or unparseable
    Corrupt {
        /// File holding the unreadable data
        path: PathBuf,
        /// Diagnostic text
        detail: String,
    },
}

impl<T> LoadOutcome<T> {
    /// Loaded value, if any
    #[inline]
    #[must_use]
    pub fn loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// True when the file parsed successfully
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

impl<T: Default> LoadOutcome<T> {
    /// Collapse to the lenient legacy behavior: anything that did not
    /// load reads as an empty/default value. Corruption is logged, not
    /// surfaced.
    #[must_use]
    pub fn or_empty(self) -> T {
        match self {
            Self::Loaded(value) => value,
            Self::Missing => T::default(),
            Self::Corrupt { path, detail } => {
                tracing::warn!(path = %path.display(), %detail, "treating corrupt document as empty");
                T::default()
            }
        }
    }
}

/// A single JSON file storing one value of type `T`
///
/// Collections are `JsonDocument<Vec<_>>`; scalars (the cached accuracy)
/// are `JsonDocument<f64>`. Saves are atomic: the new content is written
/// to a temp file in the same directory and renamed over the target, so a
/// crashed writer never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonDocument<T> {
    /// Create a document handle for `path` (no I/O)
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored value
    #[must_use]
    pub fn load(&self) -> LoadOutcome<T> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => {
                return LoadOutcome::Corrupt {
                    path: self.path.clone(),
                    detail: e.to_string(),
                }
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => LoadOutcome::Loaded(value),
            Err(e) => LoadOutcome::Corrupt {
                path: self.path.clone(),
                detail: e.to_string(),
            },
        }
    }

    /// Rewrite the document with `value`
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] on any I/O failure.
    pub fn save(&self, value: &T) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source: source.into(),
        })?;
        tmp.write_all(&json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tmp.persist(&self.path).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Record {
        name: String,
        count: u32,
    }

    fn doc_in(dir: &tempfile::TempDir) -> JsonDocument<Vec<Record>> {
        JsonDocument::new(dir.path().join("records.json"))
    }

    #[test]
    fn missing_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(&dir);
        assert!(matches!(doc.load(), LoadOutcome::Missing));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(&dir);
        let records = vec![Record {
            name: "greet".to_string(),
            count: 3,
        }];
        doc.save(&records).unwrap();

        let loaded = doc.load().loaded().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn unparseable_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(&dir);
        std::fs::write(doc.path(), b"{ not json").unwrap();

        match doc.load() {
            LoadOutcome::Corrupt { path, .. } => assert_eq!(path, doc.path()),
            other => panic!("expected corrupt, got {other:?}"),
        }
    }

    #[test]
    fn or_empty_collapses_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(&dir);
        assert!(doc.load().or_empty().is_empty());

        std::fs::write(doc.path(), b"][").unwrap();
        assert!(doc.load().or_empty().is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let doc: JsonDocument<Vec<Record>> =
            JsonDocument::new(dir.path().join("nested").join("data").join("records.json"));
        doc.save(&Vec::new()).unwrap();
        assert!(doc.path().exists());
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(&dir);
        doc.save(&vec![Record::default()]).unwrap();
        doc.save(&Vec::new()).unwrap();
        assert!(doc.load().loaded().unwrap().is_empty());
    }

    #[test]
    fn scalar_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let doc: JsonDocument<f64> = JsonDocument::new(dir.path().join("accuracy.json"));
        doc.save(&74.25).unwrap();
        assert_eq!(doc.load().loaded(), Some(74.25));
    }
}
