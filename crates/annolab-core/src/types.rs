//! Core record types
//!
//! Defines the persisted and reported shapes of the workflow:
//! - Annotations and entity spans
//! - Uncertain samples and review actions/outcomes
//! - Training backends and per-backend reports
//! - Workspace statistics and model version metadata
//!
//! Persisted types carry a `#[serde(flatten)]` map so arbitrary
//! caller-supplied fields round-trip verbatim through storage.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

fn is_false(v: &bool) -> bool {
    !*v
}

/// A labeled character span inside an annotation's text
///
/// `0 <= start <= end <= text length` is expected but deliberately not
/// validated; offsets are kept signed so odd caller shapes still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Span start (character offset, inclusive)
    #[serde(default)]
    pub start: i64,
    /// Span end (character offset, exclusive)
    #[serde(default)]
    pub end: i64,
    /// Entity label
    #[serde(default)]
    pub label: String,
    /// Caller-supplied fields preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntitySpan {
    /// Create a span
    #[inline]
    #[must_use]
    pub fn new(start: i64, end: i64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            extra: Map::new(),
        }
    }
}

/// A labeled training example: text plus intent and entity spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Annotation {
    /// The example text
    #[serde(default)]
    pub text: String,
    /// Intent label
    #[serde(default)]
    pub intent: String,
    /// Entity spans, in caller order
    #[serde(default)]
    pub entities: Vec<EntitySpan>,
    /// Caller-supplied fields preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// Create an annotation
    #[must_use]
    pub fn new(text: impl Into<String>, intent: impl Into<String>, entities: Vec<EntitySpan>) -> Self {
        Self {
            text: text.into(),
            intent: intent.into(),
            entities,
            extra: Map::new(),
        }
    }
}

/// A low-confidence model prediction pending human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainSample {
    /// Identifier unique within the workspace (uniqueness is not enforced;
    /// lookups use first-match)
    pub sample_id: String,
    /// The sampled text
    #[serde(default)]
    pub text: String,
    /// Intent predicted by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_intent: Option<String>,
    /// Intent assigned by an annotator, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Predicted entity spans
    #[serde(default)]
    pub entities: Vec<EntitySpan>,
    /// Set by the `reannotate` review action
    #[serde(default, skip_serializing_if = "is_false")]
    pub marked_for_reannotation: bool,
    /// Caller-supplied fields preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UncertainSample {
    /// Create a sample with a predicted intent
    #[must_use]
    pub fn new(
        sample_id: impl Into<String>,
        text: impl Into<String>,
        predicted_intent: impl Into<String>,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            text: text.into(),
            predicted_intent: Some(predicted_intent.into()),
            intent: None,
            entities: Vec::new(),
            marked_for_reannotation: false,
            extra: Map::new(),
        }
    }

    /// Effective intent: `predicted_intent` falls back to `intent`
    #[must_use]
    pub fn resolved_intent(&self) -> &str {
        self.predicted_intent
            .as_deref()
            .or(self.intent.as_deref())
            .unwrap_or("")
    }

    /// Build the annotation produced by promoting this sample
    ///
    /// The internal `sample_id`, review flag and any extra fields are
    /// dropped: the annotation is a fresh text/intent/entities record.
    #[must_use]
    pub fn to_annotation(&self) -> Annotation {
        Annotation::new(
            self.text.clone(),
            self.resolved_intent().to_string(),
            self.entities.clone(),
        )
    }
}

/// Reviewer decision applied to an uncertain sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Remove from the queue (resolved without promotion)
    Reviewed,
    /// Flag for re-annotation, keep in the queue
    Reannotate,
    /// Promote into the annotation collection
    AddToTraining,
}

impl ReviewAction {
    /// Parse a caller-supplied action string
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownAction`] for anything but
    /// `reviewed`, `reannotate`, `add_to_training`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "reviewed" => Ok(Self::Reviewed),
            "reannotate" => Ok(Self::Reannotate),
            "add_to_training" => Ok(Self::AddToTraining),
            other => Err(CoreError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }

    /// Wire name of the action
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reviewed => "reviewed",
            Self::Reannotate => "reannotate",
            Self::AddToTraining => "add_to_training",
        }
    }
}

impl FromStr for ReviewAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resulting state of a sample after a review action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleState {
    /// Removed from the queue without promotion (terminal)
    Resolved,
    /// Still in the queue, flagged for re-annotation
    Flagged,
    /// Removed from the queue and appended to the annotations (terminal)
    Promoted,
}

/// Status record returned by a successful review action
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    /// The reviewed sample id
    pub sample_id: String,
    /// The action that was applied
    pub action: ReviewAction,
    /// The sample's resulting state
    pub state: SampleState,
    /// The updated sample, for `reannotate`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<UncertainSample>,
}

/// Target training framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingBackend {
    /// spaCy NER model
    Spacy,
    /// Rasa NLU model
    Rasa,
    /// Both backends in sequence
    Both,
}

impl TrainingBackend {
    /// Parse a caller-supplied backend string
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownBackend`] for anything but
    /// `spacy`, `rasa`, `both`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "spacy" => Ok(Self::Spacy),
            "rasa" => Ok(Self::Rasa),
            "both" => Ok(Self::Both),
            other => Err(CoreError::UnknownBackend {
                backend: other.to_string(),
            }),
        }
    }

    /// True when spaCy training should run
    #[inline]
    #[must_use]
    pub fn includes_spacy(&self) -> bool {
        matches!(self, Self::Spacy | Self::Both)
    }

    /// True when Rasa training should run
    #[inline]
    #[must_use]
    pub fn includes_rasa(&self) -> bool {
        matches!(self, Self::Rasa | Self::Both)
    }
}

impl FromStr for TrainingBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Per-backend training result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendOutcome {
    /// `ok` or `failed`
    pub status: TrainStatus,
    /// Produced artifact path on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    /// Captured diagnostic on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendOutcome {
    /// Successful outcome
    #[must_use]
    pub fn ok(model_path: PathBuf) -> Self {
        Self {
            status: TrainStatus::Ok,
            model_path: Some(model_path),
            error: None,
        }
    }

    /// Failed outcome
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: TrainStatus::Failed,
            model_path: None,
            error: Some(error.into()),
        }
    }
}

/// Training result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainStatus {
    /// Backend produced an artifact
    Ok,
    /// Backend reported a failure
    Failed,
}

/// Result of a retraining run across the requested backends
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    /// Workspace that was retrained
    pub workspace_id: String,
    /// Per-backend outcomes, keyed `spacy` / `rasa`
    pub results: BTreeMap<String, BackendOutcome>,
    /// Refreshed accuracy, present when any backend succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl TrainReport {
    /// True when at least one backend produced an artifact
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        self.results.values().any(|r| r.status == TrainStatus::Ok)
    }
}

/// One known model version on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    /// File or sidecar the version was discovered from
    pub file: String,
    /// Model name (directory or file name)
    pub model_name: String,
    /// Training timestamp (unix seconds), when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Model version lists per backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelVersions {
    /// spaCy model versions
    pub spacy: Vec<ModelVersion>,
    /// Rasa model versions
    pub rasa: Vec<ModelVersion>,
}

/// Aggregated workspace statistics
///
/// On aggregation failure all counts are zeroed and `error` is set;
/// callers must treat a present `error` as "stats are unreliable".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceStats {
    /// Annotation collection length
    pub total_annotations: usize,
    /// Uncertain-sample queue length
    pub total_uncertain: usize,
    /// Distinct entity labels across all annotations
    pub entity_types: Vec<String>,
    /// Distinct intents across all annotations
    pub intents: Vec<String>,
    /// `entity_types.len()`
    pub num_entity_types: usize,
    /// `intents.len()`
    pub num_intents: usize,
    /// Model versions per backend
    pub model_versions: ModelVersions,
    /// Latest training timestamp (Rasa prioritized over spaCy)
    pub last_training_ts: Option<i64>,
    /// Cached accuracy scalar; not a measured metric
    pub accuracy: Option<f64>,
    /// Set when aggregation degraded to a zeroed record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkspaceStats {
    /// Zeroed record carrying an aggregation error
    #[must_use]
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Condensed model-health view derived from [`WorkspaceStats`]
#[derive(Debug, Clone, Serialize)]
pub struct ModelHealth {
    /// Latest training timestamp
    pub last_trained: Option<i64>,
    /// Model versions per backend
    pub model_versions: ModelVersions,
    /// Annotation collection length
    pub total_annotations: usize,
    /// Distinct intent count
    pub total_intents: usize,
    /// Cached accuracy scalar
    pub accuracy: Option<f64>,
}

impl From<WorkspaceStats> for ModelHealth {
    fn from(stats: WorkspaceStats) -> Self {
        Self {
            last_trained: stats.last_training_ts,
            model_versions: stats.model_versions,
            total_annotations: stats.total_annotations,
            total_intents: stats.num_intents,
            accuracy: stats.accuracy,
        }
    }
}

/// One entry in the Rasa artifact listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasaModelEntry {
    /// Artifact file name
    pub file: String,
    /// Training timestamp (unix seconds), when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<i64>,
    /// Index-supplied fields preserved verbatim (logs, snippets, paths)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
