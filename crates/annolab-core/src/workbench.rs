//! The annotation workbench facade
//!
//! The entry point an HTTP layer (or any other transport) calls into.
//! Owns the workspace store, the injected training capability, and a
//! per-workspace lock registry: every mutating operation on a
//! workspace's files runs under that workspace's mutex, eliminating the
//! lost-update race of concurrent full-file rewrites. Reads are
//! lock-free and lenient.

use crate::accuracy::AccuracyStore;
use crate::annotations::AnnotationRepository;
use crate::config::WorkbenchConfig;
use crate::error::CoreError;
use crate::export;
use crate::review;
use crate::stats;
use crate::train::{self, Trainer};
use crate::types::{
    Annotation, ModelHealth, RasaModelEntry, ReviewAction, ReviewOutcome, TrainReport,
    TrainingBackend, UncertainSample, WorkspaceStats,
};
use crate::uncertain::UncertainQueue;
use annolab_store::{JsonDocument, WorkspaceId, WorkspacePaths, WorkspaceStore};
use dashmap::DashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Workspace annotation and active-learning workbench
pub struct Workbench {
    config: WorkbenchConfig,
    store: WorkspaceStore,
    trainer: Arc<dyn Trainer>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl fmt::Debug for Workbench {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbench")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Workbench {
    /// Create a workbench with an injected training capability
    #[must_use]
    pub fn new(config: WorkbenchConfig, trainer: Arc<dyn Trainer>) -> Self {
        let store = WorkspaceStore::new(&config.workspaces_root);
        Self {
            config,
            store,
            trainer,
            locks: DashMap::new(),
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    fn lock_for(&self, id: &WorkspaceId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn accuracy_for(&self, paths: &WorkspacePaths) -> AccuracyStore {
        AccuracyStore::new(paths, self.config.accuracy_floor, self.config.accuracy_ceiling)
    }

    fn resolve(&self, id: &str) -> Result<(WorkspaceId, WorkspacePaths), CoreError> {
        let id = WorkspaceId::parse(id)?;
        let paths = self.store.ensure(&id)?;
        Ok((id, paths))
    }

    /// Create the workspace tree if absent and return its layout
    ///
    /// Idempotent; sanitizes the id (see [`WorkspaceId::parse`]).
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids or directory failures.
    pub fn ensure_workspace(&self, id: &str) -> Result<WorkspacePaths, CoreError> {
        let (id, paths) = self.resolve(id)?;
        tracing::debug!(workspace = %id, base = %paths.base().display(), "workspace ensured");
        Ok(paths)
    }

    /// List workspace ids present under the configured root
    ///
    /// # Errors
    /// [`CoreError::Storage`] when the root cannot be enumerated.
    pub fn list_workspaces(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.store.list()?)
    }

    /// Read a workspace's annotation collection (lenient)
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids.
    pub fn list_annotations(&self, id: &str) -> Result<Vec<Annotation>, CoreError> {
        let (_, paths) = self.resolve(id)?;
        Ok(AnnotationRepository::new(&paths).list())
    }

    /// Append one annotation and echo it back
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids or a failed rewrite.
    pub async fn append_annotation(&self, id: &str, annotation: Annotation) -> Result<Annotation, CoreError> {
        let (id, paths) = self.resolve(id)?;
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        Ok(AnnotationRepository::new(&paths).append(annotation)?)
    }

    /// Read a workspace's uncertain-sample queue (lenient)
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids.
    pub fn list_uncertain_samples(&self, id: &str) -> Result<Vec<UncertainSample>, CoreError> {
        let (_, paths) = self.resolve(id)?;
        Ok(UncertainQueue::new(&paths).list())
    }

    /// Overwrite a workspace's uncertain-sample queue
    ///
    /// Used by the external uncertainty-detection process to enqueue
    /// samples for review.
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids or a failed rewrite.
    pub async fn save_uncertain_samples(
        &self,
        id: &str,
        samples: &[UncertainSample],
    ) -> Result<(), CoreError> {
        let (id, paths) = self.resolve(id)?;
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        Ok(UncertainQueue::new(&paths).save(samples)?)
    }

    /// Apply a reviewer's decision to an uncertain sample
    ///
    /// `action` is one of `reviewed`, `reannotate`, `add_to_training`.
    ///
    /// # Errors
    /// [`CoreError::MissingField`] for empty parameters,
    /// [`CoreError::UnknownAction`], [`CoreError::SampleNotFound`],
    /// [`CoreError::PromotionFailed`], or [`CoreError::Storage`].
    pub async fn mark_sample_reviewed(
        &self,
        id: &str,
        sample_id: &str,
        action: &str,
    ) -> Result<ReviewOutcome, CoreError> {
        if sample_id.is_empty() {
            return Err(CoreError::MissingField("sample_id"));
        }
        if action.is_empty() {
            return Err(CoreError::MissingField("action"));
        }
        let action = ReviewAction::parse(action)?;
        let (id, paths) = self.resolve(id)?;
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        review::apply_review(
            &AnnotationRepository::new(&paths),
            &UncertainQueue::new(&paths),
            sample_id,
            action,
        )
    }

    /// Retrain the requested backend(s) for a workspace
    ///
    /// `backend` is one of `spacy`, `rasa`, `both`. Training runs to
    /// completion on the calling task; per-backend failures are captured
    /// in the report, and the cached accuracy is refreshed only when at
    /// least one backend succeeded.
    ///
    /// # Errors
    /// [`CoreError::UnknownBackend`] or [`CoreError::Storage`] for
    /// invalid parameters; training failures never error here.
    pub async fn retrain_workspace(&self, id: &str, backend: &str) -> Result<TrainReport, CoreError> {
        let backend = TrainingBackend::parse(backend)?;
        let (id, paths) = self.resolve(id)?;
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        let accuracy = self.accuracy_for(&paths);
        Ok(train::retrain(self.trainer.as_ref(), &paths, &accuracy, id.as_str(), backend).await)
    }

    /// Aggregate display statistics for a workspace
    ///
    /// Never fails: any internal problem (including an invalid id)
    /// degrades to a zeroed record with an `error` field.
    #[must_use]
    pub fn get_workspace_stats(&self, id: &str) -> WorkspaceStats {
        let (_, paths) = match self.resolve(id) {
            Ok(resolved) => resolved,
            Err(e) => return WorkspaceStats::degraded(e.to_string()),
        };
        stats::compute_stats(&paths, &self.accuracy_for(&paths))
    }

    /// Condensed model-health view of [`Self::get_workspace_stats`]
    #[must_use]
    pub fn model_health(&self, id: &str) -> ModelHealth {
        self.get_workspace_stats(id).into()
    }

    /// Mean cached accuracy across all workspaces
    ///
    /// Returns `None` when no workspaces exist. Workspaces without a
    /// stored accuracy are seeded on the way through, like the stats
    /// path.
    ///
    /// # Errors
    /// [`CoreError::Storage`] when the workspace root cannot be listed.
    pub fn average_accuracy(&self) -> Result<Option<f64>, CoreError> {
        let ids = self.store.list()?;
        let mut values = Vec::new();
        for raw in &ids {
            let Ok(id) = WorkspaceId::parse(raw) else {
                continue;
            };
            let paths = self.store.paths(&id);
            match self.accuracy_for(&paths).ensure() {
                Ok(value) => values.push(value),
                Err(e) => {
                    tracing::warn!(workspace = %id, error = %e, "skipping workspace in accuracy average");
                }
            }
        }
        if values.is_empty() {
            return Ok(None);
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok(Some((mean * 100.0).round() / 100.0))
    }

    /// List a workspace's Rasa model artifacts
    ///
    /// Prefers `models_index.json`; falls back to scanning the model
    /// directory for `*.tar.gz` archives timestamped by modification
    /// time.
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids.
    pub fn list_models(&self, id: &str) -> Result<Vec<RasaModelEntry>, CoreError> {
        let (_, paths) = self.resolve(id)?;
        let index: JsonDocument<Vec<RasaModelEntry>> = JsonDocument::new(paths.rasa_index_file());
        if let Some(entries) = index.load().loaded() {
            return Ok(entries);
        }

        let mut entries = Vec::new();
        if let Ok(dir) = std::fs::read_dir(paths.rasa_model_dir()) {
            let mut files: Vec<_> = dir.flatten().collect();
            files.sort_by_key(|e| e.file_name());
            for entry in files {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !name.ends_with(".tar.gz") {
                    continue;
                }
                let trained_at = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                    .and_then(|d| i64::try_from(d.as_secs()).ok());
                let mut extra = serde_json::Map::new();
                extra.insert(
                    "path".to_string(),
                    serde_json::Value::from(entry.path().to_string_lossy().into_owned()),
                );
                entries.push(RasaModelEntry {
                    file: name,
                    trained_at,
                    extra,
                });
            }
        }
        Ok(entries)
    }

    /// Export the annotation collection as Rasa NLU training data
    ///
    /// Writes `data/nlu.yml` under the workspace and returns its path.
    ///
    /// # Errors
    /// [`CoreError::Storage`] for invalid ids or a failed write.
    pub async fn export_rasa_nlu(&self, id: &str) -> Result<PathBuf, CoreError> {
        let (id, paths) = self.resolve(id)?;
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        let annotations = AnnotationRepository::new(&paths).list();
        Ok(export::write_rasa_nlu(&paths, &annotations)?)
    }
}
