//! Uncertain-sample queue
//!
//! Samples flagged for human review by an external uncertainty-detection
//! process. The queue does not enforce `sample_id` uniqueness; lookups
//! use first-match.

use crate::types::UncertainSample;
use annolab_store::{JsonDocument, StoreError, WorkspacePaths};

/// Access to one workspace's uncertain-sample queue
#[derive(Debug, Clone)]
pub struct UncertainQueue {
    doc: JsonDocument<Vec<UncertainSample>>,
}

impl UncertainQueue {
    /// Queue over the workspace's `uncertain_samples.json`
    #[inline]
    #[must_use]
    pub fn new(paths: &WorkspacePaths) -> Self {
        Self {
            doc: JsonDocument::new(paths.uncertain_samples_file()),
        }
    }

    /// Read the whole queue leniently (missing or corrupt reads as empty)
    #[must_use]
    pub fn list(&self) -> Vec<UncertainSample> {
        self.doc.load().or_empty()
    }

    /// Overwrite the queue with `samples`
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the rewrite fails.
    pub fn save(&self, samples: &[UncertainSample]) -> Result<(), StoreError> {
        self.doc.save(&samples.to_vec())
    }

    /// Index of the first sample matching `sample_id`
    #[must_use]
    pub fn position(samples: &[UncertainSample], sample_id: &str) -> Option<usize> {
        samples.iter().position(|s| s.sample_id == sample_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annolab_store::{WorkspaceId, WorkspaceStore};
    use pretty_assertions::assert_eq;

    fn queue() -> (tempfile::TempDir, UncertainQueue) {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());
        let paths = store.ensure(&WorkspaceId::parse("demo").unwrap()).unwrap();
        (dir, UncertainQueue::new(&paths))
    }

    #[test]
    fn queue_starts_empty_without_file() {
        let (_dir, queue) = queue();
        assert!(queue.list().is_empty());
    }

    #[test]
    fn save_then_list_round_trips() {
        let (_dir, queue) = queue();
        let samples = vec![
            UncertainSample::new("s1", "book a flight", "book_flight"),
            UncertainSample::new("s2", "hello", "greet"),
        ];
        queue.save(&samples).unwrap();
        assert_eq!(queue.list(), samples);
    }

    #[test]
    fn duplicate_ids_match_first() {
        let (_dir, queue) = queue();
        let mut dup = UncertainSample::new("s1", "second", "greet");
        dup.marked_for_reannotation = true;
        let samples = vec![UncertainSample::new("s1", "first", "greet"), dup];
        queue.save(&samples).unwrap();

        let listed = queue.list();
        let idx = UncertainQueue::position(&listed, "s1").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(listed[idx].text, "first");
    }

    #[test]
    fn missing_id_has_no_position() {
        let samples = vec![UncertainSample::new("s1", "hi", "greet")];
        assert_eq!(UncertainQueue::position(&samples, "nope"), None);
    }
}
