//! Review/promotion state machine
//!
//! Applies a reviewer's decision to an uncertain sample:
//!
//! | Current state    | Action            | Effect                                   | Result   |
//! |------------------|-------------------|------------------------------------------|----------|
//! | pending/flagged  | `reviewed`        | remove from queue                        | resolved |
//! | pending/flagged  | `reannotate`      | set flag, keep in queue                  | flagged  |
//! | pending/flagged  | `add_to_training` | append to annotations, remove from queue | promoted |
//!
//! Promotion appends to the annotation collection first; if that write
//! fails the sample stays in the queue and the error is reported as
//! [`CoreError::PromotionFailed`].

use crate::annotations::AnnotationRepository;
use crate::error::CoreError;
use crate::types::{ReviewAction, ReviewOutcome, SampleState};
use crate::uncertain::UncertainQueue;

/// Apply `action` to the first queue entry matching `sample_id`
///
/// # Errors
/// - [`CoreError::SampleNotFound`] when no entry matches; no mutation.
/// - [`CoreError::PromotionFailed`] when the annotation append fails;
///   the queue is left untouched.
/// - [`CoreError::Storage`] when a queue rewrite fails.
pub fn apply_review(
    annotations: &AnnotationRepository,
    queue: &UncertainQueue,
    sample_id: &str,
    action: ReviewAction,
) -> Result<ReviewOutcome, CoreError> {
    let mut samples = queue.list();
    let Some(idx) = UncertainQueue::position(&samples, sample_id) else {
        return Err(CoreError::SampleNotFound {
            sample_id: sample_id.to_string(),
        });
    };

    match action {
        ReviewAction::Reviewed => {
            samples.remove(idx);
            queue.save(&samples)?;
            tracing::info!(sample_id, "sample resolved");
            Ok(ReviewOutcome {
                sample_id: sample_id.to_string(),
                action,
                state: SampleState::Resolved,
                sample: None,
            })
        }
        ReviewAction::Reannotate => {
            samples[idx].marked_for_reannotation = true;
            let sample = samples[idx].clone();
            queue.save(&samples)?;
            tracing::info!(sample_id, "sample flagged for re-annotation");
            Ok(ReviewOutcome {
                sample_id: sample_id.to_string(),
                action,
                state: SampleState::Flagged,
                sample: Some(sample),
            })
        }
        ReviewAction::AddToTraining => {
            let annotation = samples[idx].to_annotation();
            if let Err(source) = annotations.append(annotation) {
                tracing::error!(sample_id, %source, "promotion append failed; sample kept in queue");
                return Err(CoreError::PromotionFailed {
                    sample_id: sample_id.to_string(),
                    source,
                });
            }
            samples.remove(idx);
            // The annotation write is the source of truth; a queue-save
            // failure here leaves a duplicate behind but the promotion
            // itself has happened.
            if let Err(e) = queue.save(&samples) {
                tracing::error!(sample_id, %e, "failed to remove promoted sample from queue");
            }
            tracing::info!(sample_id, "sample promoted to training set");
            Ok(ReviewOutcome {
                sample_id: sample_id.to_string(),
                action,
                state: SampleState::Promoted,
                sample: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UncertainSample;
    use annolab_store::{WorkspaceId, WorkspacePaths, WorkspaceStore};
    use pretty_assertions::assert_eq;

    fn setup(samples: Vec<UncertainSample>) -> (tempfile::TempDir, WorkspacePaths) {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());
        let paths = store.ensure(&WorkspaceId::parse("demo").unwrap()).unwrap();
        UncertainQueue::new(&paths).save(&samples).unwrap();
        (dir, paths)
    }

    fn one_sample() -> Vec<UncertainSample> {
        vec![UncertainSample::new("s1", "book a flight", "book_flight")]
    }

    #[test]
    fn reviewed_removes_sample() {
        let (_dir, paths) = setup(one_sample());
        let repo = AnnotationRepository::new(&paths);
        let queue = UncertainQueue::new(&paths);

        let outcome = apply_review(&repo, &queue, "s1", ReviewAction::Reviewed).unwrap();
        assert_eq!(outcome.state, SampleState::Resolved);
        assert!(queue.list().is_empty());
        assert!(repo.list().is_empty());
    }

    #[test]
    fn reannotate_flags_and_keeps_sample() {
        let (_dir, paths) = setup(one_sample());
        let repo = AnnotationRepository::new(&paths);
        let queue = UncertainQueue::new(&paths);

        let outcome = apply_review(&repo, &queue, "s1", ReviewAction::Reannotate).unwrap();
        assert_eq!(outcome.state, SampleState::Flagged);
        assert!(outcome.sample.unwrap().marked_for_reannotation);

        let listed = queue.list();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].marked_for_reannotation);
    }

    #[test]
    fn reannotate_is_idempotent() {
        let (_dir, paths) = setup(one_sample());
        let repo = AnnotationRepository::new(&paths);
        let queue = UncertainQueue::new(&paths);

        apply_review(&repo, &queue, "s1", ReviewAction::Reannotate).unwrap();
        apply_review(&repo, &queue, "s1", ReviewAction::Reannotate).unwrap();

        let listed = queue.list();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].marked_for_reannotation);
    }

    #[test]
    fn promotion_moves_exactly_one_sample() {
        let (_dir, paths) = setup(one_sample());
        let repo = AnnotationRepository::new(&paths);
        let queue = UncertainQueue::new(&paths);

        let outcome = apply_review(&repo, &queue, "s1", ReviewAction::AddToTraining).unwrap();
        assert_eq!(outcome.state, SampleState::Promoted);

        assert!(queue.list().is_empty());
        let anns = repo.list();
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "book a flight");
        assert_eq!(anns[0].intent, "book_flight");
        assert!(anns[0].entities.is_empty());
    }

    #[test]
    fn promotion_with_duplicate_ids_removes_first_only() {
        let samples = vec![
            UncertainSample::new("s1", "first", "greet"),
            UncertainSample::new("s1", "second", "greet"),
        ];
        let (_dir, paths) = setup(samples);
        let repo = AnnotationRepository::new(&paths);
        let queue = UncertainQueue::new(&paths);

        apply_review(&repo, &queue, "s1", ReviewAction::AddToTraining).unwrap();

        let remaining = queue.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "second");
        assert_eq!(repo.list().len(), 1);
    }

    #[test]
    fn unknown_sample_leaves_collections_unchanged() {
        let (_dir, paths) = setup(one_sample());
        let repo = AnnotationRepository::new(&paths);
        let queue = UncertainQueue::new(&paths);

        for action in [
            ReviewAction::Reviewed,
            ReviewAction::Reannotate,
            ReviewAction::AddToTraining,
        ] {
            let err = apply_review(&repo, &queue, "ghost", action).unwrap_err();
            assert!(matches!(err, CoreError::SampleNotFound { .. }));
        }
        assert_eq!(queue.list().len(), 1);
        assert!(repo.list().is_empty());
    }

    #[test]
    fn failed_promotion_keeps_sample_in_queue() {
        let (_dir, paths) = setup(one_sample());
        let queue = UncertainQueue::new(&paths);

        // make the annotations file an unwritable directory so the append fails
        let ann_file = paths.annotations_file();
        std::fs::remove_file(&ann_file).unwrap();
        std::fs::create_dir(&ann_file).unwrap();
        let repo = AnnotationRepository::new(&paths);

        let err = apply_review(&repo, &queue, "s1", ReviewAction::AddToTraining).unwrap_err();
        assert!(matches!(err, CoreError::PromotionFailed { .. }));
        assert_eq!(queue.list().len(), 1);
    }
}
