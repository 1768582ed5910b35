//! Workspace identity and directory layout
//!
//! A workspace is one directory subtree keyed by a sanitized id. The
//! layout is fixed:
//!
//! ```text
//! <root>/<id>/data/annotations.json
//! <root>/<id>/data/intents.json
//! <root>/<id>/data/entities.json
//! <root>/<id>/data/uncertain_samples.json
//! <root>/<id>/data/accuracy.json
//! <root>/<id>/models/spacy_model/...
//! <root>/<id>/models/rasa_model/...
//! <root>/<id>/deployment_history.json
//! ```

use crate::error::StoreError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Sanitized workspace identifier
///
/// Only alphanumeric characters, `-` and `_` are retained from caller
/// input; everything else is silently dropped, not rejected. An id that
/// sanitizes to empty is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Sanitize and validate a caller-supplied id
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidWorkspaceId`] when nothing survives
    /// sanitization.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let safe: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            .collect();
        if safe.is_empty() {
            return Err(StoreError::InvalidWorkspaceId(raw.to_string()));
        }
        Ok(Self(safe))
    }

    /// The sanitized id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkspaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for WorkspaceId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical file layout inside one workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    base: PathBuf,
}

impl WorkspacePaths {
    fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Workspace base directory
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `data/` directory
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.base.join("data")
    }

    /// Annotation collection
    #[must_use]
    pub fn annotations_file(&self) -> PathBuf {
        self.data_dir().join("annotations.json")
    }

    /// Intent catalog (seeded empty, not mutated by this core)
    #[must_use]
    pub fn intents_file(&self) -> PathBuf {
        self.data_dir().join("intents.json")
    }

    /// Entity catalog (seeded empty, not mutated by this core)
    #[must_use]
    pub fn entities_file(&self) -> PathBuf {
        self.data_dir().join("entities.json")
    }

    /// Uncertain-sample queue
    #[must_use]
    pub fn uncertain_samples_file(&self) -> PathBuf {
        self.data_dir().join("uncertain_samples.json")
    }

    /// Cached accuracy scalar
    #[must_use]
    pub fn accuracy_file(&self) -> PathBuf {
        self.data_dir().join("accuracy.json")
    }

    /// Generated Rasa NLU training data
    #[must_use]
    pub fn rasa_nlu_file(&self) -> PathBuf {
        self.data_dir().join("nlu.yml")
    }

    /// `models/` directory
    #[must_use]
    pub fn models_dir(&self) -> PathBuf {
        self.base.join("models")
    }

    /// spaCy model artifacts
    #[must_use]
    pub fn spacy_model_dir(&self) -> PathBuf {
        self.models_dir().join("spacy_model")
    }

    /// Rasa model artifacts
    #[must_use]
    pub fn rasa_model_dir(&self) -> PathBuf {
        self.models_dir().join("rasa_model")
    }

    /// Index of all known Rasa artifacts
    #[must_use]
    pub fn rasa_index_file(&self) -> PathBuf {
        self.rasa_model_dir().join("models_index.json")
    }

    /// Deployment record list (owned by the deployment collaborator)
    #[must_use]
    pub fn deployment_history_file(&self) -> PathBuf {
        self.base.join("deployment_history.json")
    }
}

/// Resolves and lazily creates per-workspace directory trees under a root
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    /// Create a store rooted at `root` (no I/O until first use)
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspaces root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the layout for `id` without touching the filesystem
    #[must_use]
    pub fn paths(&self, id: &WorkspaceId) -> WorkspacePaths {
        WorkspacePaths::new(self.root.join(id.as_str()))
    }

    /// Ensure the workspace directory tree exists
    ///
    /// Creates the data and per-backend model directories and seeds empty
    /// annotation/intent/entity collections when the files are missing.
    /// Idempotent: repeated calls are a no-op beyond the existence checks.
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when a directory or seed file cannot
    /// be created.
    pub fn ensure(&self, id: &WorkspaceId) -> Result<WorkspacePaths, StoreError> {
        let paths = self.paths(id);
        for dir in [
            paths.data_dir(),
            paths.spacy_model_dir(),
            paths.rasa_model_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|source| StoreError::Write { path: dir, source })?;
        }
        for file in [
            paths.annotations_file(),
            paths.intents_file(),
            paths.entities_file(),
        ] {
            if !file.exists() {
                tracing::debug!(workspace = %id, path = %file.display(), "seeding empty collection");
                std::fs::write(&file, b"[]").map_err(|source| StoreError::Write { path: file, source })?;
            }
        }
        Ok(paths)
    }

    /// List workspace ids present under the root
    ///
    /// Creates the root when missing. Unreadable directory entries are
    /// skipped rather than failing the listing.
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the root cannot be created, or
    /// [`StoreError::Read`] when it cannot be enumerated.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|source| StoreError::Write {
            path: self.root.clone(),
            source,
        })?;
        let entries = std::fs::read_dir(&self.root).map_err(|source| StoreError::Read {
            path: self.root.clone(),
            source,
        })?;
        let mut ids = Vec::new();
        for entry in entries.flatten() {
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
