//! Retraining orchestration
//!
//! Actual training is a black box behind the [`Trainer`] capability: the
//! core hands over a workspace directory and gets back an artifact path
//! or a diagnostic. This keeps the workflow and its tests independent of
//! any ML framework being installed.

use crate::accuracy::AccuracyStore;
use crate::error::TrainingError;
use crate::types::{BackendOutcome, TrainReport, TrainingBackend};
use annolab_store::WorkspacePaths;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Injected training capability
///
/// Implementations are expected to read the workspace's annotation
/// collection themselves and to persist artifacts (plus version
/// metadata) under the workspace's model directories.
#[async_trait]
pub trait Trainer: Send + Sync {
    /// Train a spaCy NER model for the workspace rooted at `workspace_dir`
    ///
    /// # Errors
    /// Returns [`TrainingError`] with captured diagnostics on failure.
    async fn train_spacy(&self, workspace_dir: &Path) -> Result<PathBuf, TrainingError>;

    /// Train a Rasa NLU model for the workspace rooted at `workspace_dir`
    ///
    /// # Errors
    /// Returns [`TrainingError`] with captured diagnostics on failure.
    async fn train_rasa(&self, workspace_dir: &Path) -> Result<PathBuf, TrainingError>;
}

/// Retrain the requested backend(s) for one workspace
///
/// Runs synchronously from the caller's point of view: each backend is
/// awaited to completion before the next starts. Per-backend failures
/// are captured in the report rather than aborting the run; the cached
/// accuracy is refreshed only when at least one backend succeeded.
pub async fn retrain(
    trainer: &dyn Trainer,
    paths: &WorkspacePaths,
    accuracy: &AccuracyStore,
    workspace_id: &str,
    backend: TrainingBackend,
) -> TrainReport {
    let mut results = BTreeMap::new();

    if backend.includes_spacy() {
        tracing::info!(workspace_id, "starting spaCy training");
        let outcome = match trainer.train_spacy(paths.base()).await {
            Ok(model_path) => {
                tracing::info!(workspace_id, model_path = %model_path.display(), "spaCy training completed");
                BackendOutcome::ok(model_path)
            }
            Err(e) => {
                tracing::error!(workspace_id, error = %e, "spaCy training failed");
                BackendOutcome::failed(e.details)
            }
        };
        results.insert("spacy".to_string(), outcome);
    }

    if backend.includes_rasa() {
        tracing::info!(workspace_id, "starting Rasa training");
        let outcome = match trainer.train_rasa(paths.base()).await {
            Ok(model_path) => {
                tracing::info!(workspace_id, model_path = %model_path.display(), "Rasa training completed");
                BackendOutcome::ok(model_path)
            }
            Err(e) => {
                tracing::error!(workspace_id, error = %e, "Rasa training failed");
                BackendOutcome::failed(e.details)
            }
        };
        results.insert("rasa".to_string(), outcome);
    }

    let mut report = TrainReport {
        workspace_id: workspace_id.to_string(),
        results,
        accuracy: None,
    };

    if report.any_succeeded() {
        match accuracy.refresh() {
            Ok(value) => report.accuracy = Some(value),
            Err(e) => {
                tracing::error!(workspace_id, error = %e, "failed to refresh accuracy after training");
            }
        }
    }

    report
}
