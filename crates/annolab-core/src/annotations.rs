//! Annotation repository
//!
//! Append/list operations over a workspace's annotation collection.
//! The collection is append-only from the caller's perspective; the
//! promotion flow also appends programmatically. Records are never
//! updated in place or removed.

use crate::types::Annotation;
use annolab_store::{JsonDocument, LoadOutcome, StoreError, WorkspacePaths};

/// Append/list access to one workspace's annotation collection
#[derive(Debug, Clone)]
pub struct AnnotationRepository {
    doc: JsonDocument<Vec<Annotation>>,
}

impl AnnotationRepository {
    /// Repository over the workspace's `annotations.json`
    #[inline]
    #[must_use]
    pub fn new(paths: &WorkspacePaths) -> Self {
        Self {
            doc: JsonDocument::new(paths.annotations_file()),
        }
    }

    /// Read the whole collection leniently: a missing or corrupt file
    /// reads as empty (corruption is logged by the store layer)
    #[must_use]
    pub fn list(&self) -> Vec<Annotation> {
        self.doc.load().or_empty()
    }

    /// Read the collection, keeping missing and corrupt distinct
    #[must_use]
    pub fn load(&self) -> LoadOutcome<Vec<Annotation>> {
        self.doc.load()
    }

    /// Append one annotation, rewriting the whole collection
    ///
    /// No validation of entity span bounds or label membership is
    /// performed; the record is stored and echoed back as-is.
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the rewrite fails; the
    /// collection is left unchanged in that case.
    pub fn append(&self, annotation: Annotation) -> Result<Annotation, StoreError> {
        let mut items = self.doc.load().or_empty();
        items.push(annotation.clone());
        self.doc.save(&items)?;
        tracing::debug!(total = items.len(), "appended annotation");
        Ok(annotation)
    }
}
