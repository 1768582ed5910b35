//! Testing utilities for the Annolab workspace
//!
//! Shared trainer doubles, fixtures, and workspace builders.

#![allow(missing_docs)]

use annolab_core::error::TrainingError;
use annolab_core::{Annotation, EntitySpan, Trainer, UncertainSample, Workbench, WorkbenchConfig};
use annolab_store::WorkspacePaths;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A [`Trainer`] with scripted per-backend outcomes
///
/// Records which backends were invoked, in order. On success it also
/// writes a plausible artifact into the workspace's model directory so
/// stats and model listings have something to discover.
#[derive(Debug)]
pub struct ScriptedTrainer {
    spacy: Result<(), TrainingError>,
    rasa: Result<(), TrainingError>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTrainer {
    pub fn succeeding() -> Self {
        Self {
            spacy: Ok(()),
            rasa: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(details: &str) -> Self {
        Self {
            spacy: Err(TrainingError::new(details)),
            rasa: Err(TrainingError::new(details)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_spacy(mut self, result: Result<(), TrainingError>) -> Self {
        self.spacy = result;
        self
    }

    pub fn with_rasa(mut self, result: Result<(), TrainingError>) -> Self {
        self.rasa = result;
        self
    }

    /// Backends invoked so far, in call order (`"spacy"` / `"rasa"`).
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, backend: &str) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(backend.to_string());
    }
}

#[async_trait]
impl Trainer for ScriptedTrainer {
    async fn train_spacy(&self, workspace_dir: &Path) -> Result<PathBuf, TrainingError> {
        self.record("spacy");
        self.spacy.clone()?;
        let dir = workspace_dir.join("models").join("spacy_model");
        Ok(write_spacy_model(&dir, chrono::Utc::now().timestamp()))
    }

    async fn train_rasa(&self, workspace_dir: &Path) -> Result<PathBuf, TrainingError> {
        self.record("rasa");
        self.rasa.clone()?;
        let dir = workspace_dir.join("models").join("rasa_model");
        let name = format!("{}.tar.gz", chrono::Utc::now().format("%Y%m%d-%H%M%S"));
        Ok(write_rasa_archive(&dir, &name))
    }
}

/// Write a spaCy-shaped model directory (`model_v<ts>/meta.json` plus a
/// `meta_v<ts>.json` sidecar) and return the model directory path.
pub fn write_spacy_model(spacy_dir: &Path, trained_at: i64) -> PathBuf {
    let model_dir = spacy_dir.join(format!("model_v{trained_at}"));
    std::fs::create_dir_all(&model_dir).unwrap();
    let meta = serde_json::json!({"name": "spacy_ner", "trained_at": trained_at});
    std::fs::write(model_dir.join("meta.json"), meta.to_string()).unwrap();
    std::fs::write(
        spacy_dir.join(format!("meta_v{trained_at}.json")),
        meta.to_string(),
    )
    .unwrap();
    model_dir
}

/// Write a Rasa-shaped model archive and return its path.
pub fn write_rasa_archive(rasa_dir: &Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(rasa_dir).unwrap();
    let path = rasa_dir.join(name);
    std::fs::write(&path, b"tar.gz bytes").unwrap();
    path
}

/// A workbench rooted in a fresh temp directory, with a scripted trainer.
///
/// The temp dir guard must be kept alive for the workbench's lifetime.
pub fn temp_workbench(trainer: Arc<ScriptedTrainer>) -> (tempfile::TempDir, Workbench) {
    let dir = tempfile::tempdir().unwrap();
    let config = WorkbenchConfig::new(dir.path());
    (dir, Workbench::new(config, trainer))
}

/// A workspace id unlikely to collide across tests.
pub fn unique_workspace_id() -> String {
    format!("ws-{}", uuid::Uuid::new_v4().simple())
}

pub fn sample(sample_id: &str, text: &str, predicted_intent: &str) -> UncertainSample {
    UncertainSample::new(sample_id, text, predicted_intent)
}

pub fn annotation(text: &str, intent: &str) -> Annotation {
    Annotation::new(text, intent, vec![])
}

pub fn annotation_with_entity(
    text: &str,
    intent: &str,
    start: i64,
    end: i64,
    label: &str,
) -> Annotation {
    Annotation::new(text, intent, vec![EntitySpan::new(start, end, label)])
}

/// File layout assertions for a freshly ensured workspace.
pub fn assert_workspace_layout(paths: &WorkspacePaths) {
    assert!(paths.base().is_dir());
    assert!(paths.data_dir().is_dir());
    assert!(paths.spacy_model_dir().is_dir());
    assert!(paths.rasa_model_dir().is_dir());
    assert!(paths.annotations_file().is_file());
    assert!(paths.intents_file().is_file());
    assert!(paths.entities_file().is_file());
}
