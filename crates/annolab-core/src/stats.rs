//! Workspace statistics aggregator
//!
//! Derives display counts from the annotation collection and uncertain
//! queue, scans the per-backend model directories for version metadata,
//! and reads (lazily seeding) the cached accuracy scalar. Aggregation
//! never raises: any internal failure degrades to a zeroed record with
//! an `error` field.

use crate::accuracy::AccuracyStore;
use crate::annotations::AnnotationRepository;
use crate::error::CoreError;
use crate::types::{ModelVersion, ModelVersions, WorkspaceStats};
use crate::uncertain::UncertainQueue;
use annolab_store::WorkspacePaths;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Timestamp fields recognized in model metadata sidecars
#[derive(Debug, Default, Deserialize)]
struct MetaSidecar {
    #[serde(default)]
    trained_at: Option<i64>,
    #[serde(default)]
    training_timestamp: Option<i64>,
}

impl MetaSidecar {
    fn timestamp(&self) -> Option<i64> {
        self.trained_at.or(self.training_timestamp)
    }
}

/// Compute stats for one workspace, degrading instead of failing
#[must_use]
pub fn compute_stats(paths: &WorkspacePaths, accuracy: &AccuracyStore) -> WorkspaceStats {
    match try_compute(paths, accuracy) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(workspace = %paths.base().display(), error = %e, "stats aggregation degraded");
            WorkspaceStats::degraded(e.to_string())
        }
    }
}

fn try_compute(paths: &WorkspacePaths, accuracy: &AccuracyStore) -> Result<WorkspaceStats, CoreError> {
    let annotations = AnnotationRepository::new(paths).list();
    let uncertain = UncertainQueue::new(paths).list();

    let mut intents = BTreeSet::new();
    let mut entity_types = BTreeSet::new();
    for ann in &annotations {
        if !ann.intent.is_empty() {
            intents.insert(ann.intent.clone());
        }
        for ent in &ann.entities {
            if !ent.label.is_empty() {
                entity_types.insert(ent.label.clone());
            }
        }
    }

    let (spacy, spacy_ts) = scan_model_dir(&paths.spacy_model_dir());
    let (rasa, rasa_ts) = scan_model_dir(&paths.rasa_model_dir());
    // Rasa's timestamp wins when both backends have artifacts
    let last_training_ts = rasa_ts.or(spacy_ts);

    let accuracy = accuracy.ensure()?;

    Ok(WorkspaceStats {
        total_annotations: annotations.len(),
        total_uncertain: uncertain.len(),
        num_entity_types: entity_types.len(),
        num_intents: intents.len(),
        entity_types: entity_types.into_iter().collect(),
        intents: intents.into_iter().collect(),
        model_versions: ModelVersions { spacy, rasa },
        last_training_ts,
        accuracy: Some(accuracy),
        error: None,
    })
}

/// Scan one backend's model directory for version metadata
///
/// Recognizes:
/// - subdirectories holding a `meta.json` with a training timestamp
///   (spaCy model directories)
/// - `*.tar.gz` archives, timestamped by file modification time (Rasa)
/// - `*meta*.json` sidecars carrying a training timestamp
///
/// Returns the versions (sorted by name for determinism) and the max
/// timestamp seen in the directory.
fn scan_model_dir(dir: &Path) -> (Vec<ModelVersion>, Option<i64>) {
    let mut versions = Vec::new();
    let mut max_ts: Option<i64> = None;

    let Ok(entries) = std::fs::read_dir(dir) else {
        return (versions, max_ts);
    };
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if path.is_dir() {
            let meta_file = path.join("meta.json");
            let Some(ts) = read_meta_timestamp(&meta_file) else {
                continue;
            };
            versions.push(ModelVersion {
                file: meta_file.to_string_lossy().into_owned(),
                model_name: name,
                timestamp: Some(ts),
            });
            max_ts = max_ts.max(Some(ts));
        } else if name.ends_with(".tar.gz") {
            let ts = mtime_secs(&path);
            versions.push(ModelVersion {
                file: name.clone(),
                model_name: name,
                timestamp: ts,
            });
            max_ts = max_ts.max(ts);
        } else if name.ends_with(".json") && name.contains("meta") {
            let ts = read_meta_timestamp(&path);
            versions.push(ModelVersion {
                file: name.clone(),
                model_name: name,
                timestamp: ts,
            });
            max_ts = max_ts.max(ts);
        }
    }
    (versions, max_ts)
}

fn read_meta_timestamp(path: &Path) -> Option<i64> {
    let bytes = std::fs::read(path).ok()?;
    let meta: MetaSidecar = serde_json::from_slice(&bytes).ok()?;
    meta.timestamp()
}

fn mtime_secs(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    i64::try_from(secs).ok()
}
