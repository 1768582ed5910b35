//! Cached workspace accuracy
//!
//! A single float per workspace, seeded lazily with a placeholder drawn
//! from a configured range and overwritten after each successful
//! retraining. It is a stored scalar, not a measured metric; callers
//! must not assume it reflects real model quality.

use annolab_store::{JsonDocument, StoreError, WorkspacePaths};
use rand::Rng;

/// Load/seed/refresh access to one workspace's accuracy scalar
#[derive(Debug, Clone)]
pub struct AccuracyStore {
    doc: JsonDocument<f64>,
    floor: f64,
    ceiling: f64,
}

impl AccuracyStore {
    /// Store over the workspace's `accuracy.json`
    #[inline]
    #[must_use]
    pub fn new(paths: &WorkspacePaths, floor: f64, ceiling: f64) -> Self {
        Self {
            doc: JsonDocument::new(paths.accuracy_file()),
            floor,
            ceiling,
        }
    }

    /// Stored accuracy, if any (missing or unparseable reads as none)
    #[must_use]
    pub fn load(&self) -> Option<f64> {
        self.doc.load().loaded()
    }

    /// Stored accuracy, seeding and persisting a placeholder on first access
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the seeded value cannot be
    /// persisted.
    pub fn ensure(&self) -> Result<f64, StoreError> {
        if let Some(value) = self.load() {
            return Ok(value);
        }
        let value = self.refresh()?;
        tracing::debug!(accuracy = value, "seeded placeholder accuracy");
        Ok(value)
    }

    /// Overwrite with a fresh placeholder value and return it
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the value cannot be persisted.
    pub fn refresh(&self) -> Result<f64, StoreError> {
        let raw: f64 = rand::rng().random_range(self.floor..=self.ceiling);
        let value = (raw * 100.0).round() / 100.0;
        self.doc.save(&value)?;
        Ok(value)
    }
}
