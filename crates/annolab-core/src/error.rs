//! Error types for the annotation core
//!
//! Covers the failure taxonomy of the review, retraining and stats
//! workflows: invalid workspace ids, missing caller parameters, unknown
//! review actions and backends, failed promotions, storage failures, and
//! training failures propagated from the collaborator.

use annolab_store::StoreError;

/// Maximum diagnostic text carried inside a [`TrainingError`]
const DIAGNOSTIC_CAP: usize = 4000;

/// Main error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Storage failure (includes invalid workspace ids)
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Caller omitted a required parameter
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No queue entry matches the sample id
    #[error("sample not found: {sample_id}")]
    SampleNotFound {
        /// The id that failed to match
        sample_id: String,
    },

    /// Review action is not one of `reviewed`, `reannotate`, `add_to_training`
    #[error("unknown review action: {action:?}")]
    UnknownAction {
        /// The unrecognized action string
        action: String,
    },

    /// Training backend is not one of `spacy`, `rasa`, `both`
    #[error("unknown training backend: {backend:?}")]
    UnknownBackend {
        /// The unrecognized backend string
        backend: String,
    },

    /// Promotion could not append to the annotation collection;
    /// the sample was left in the queue
    #[error("promotion failed for sample {sample_id}")]
    PromotionFailed {
        /// Sample that stayed in the queue
        sample_id: String,
        /// The write failure that aborted the promotion
        #[source]
        source: StoreError,
    },

    /// Training collaborator reported a failure
    #[error(transparent)]
    Training(#[from] TrainingError),
}

impl CoreError {
    /// True when the error means the caller sent a bad request rather
    /// than the core hitting an internal failure
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Storage(StoreError::InvalidWorkspaceId(_))
                | Self::MissingField(_)
                | Self::SampleNotFound { .. }
                | Self::UnknownAction { .. }
                | Self::UnknownBackend { .. }
        )
    }
}

/// Failure reported by the training collaborator
///
/// Carries captured diagnostic text (truncated) so callers can surface
/// it for debuggability.
#[derive(Debug, Clone, thiserror::Error)]
#[error("training failed: {details}")]
pub struct TrainingError {
    /// Truncated diagnostic text from the trainer
    pub details: String,
}

impl TrainingError {
    /// Create a training error, capping the diagnostic text
    #[must_use]
    pub fn new(details: impl Into<String>) -> Self {
        let mut details: String = details.into();
        if details.len() > DIAGNOSTIC_CAP {
            // truncate on a char boundary
            let mut cut = DIAGNOSTIC_CAP;
            while !details.is_char_boundary(cut) {
                cut -= 1;
            }
            details.truncate(cut);
        }
        Self { details }
    }
}
