//! Annolab Core - NLU annotation workbench
//!
//! The workflow layer on top of [`annolab_store`]:
//! - Maintains per-workspace annotation collections
//! - Queues uncertain model predictions for human review
//! - Applies review decisions (resolve, flag, promote to training data)
//! - Orchestrates retraining through an injected [`Trainer`]
//! - Aggregates display statistics and exports Rasa NLU training data
//!
//! # Example
//!
//! ```rust,ignore
//! use annolab_core::{Annotation, Workbench, WorkbenchConfig};
//! use std::sync::Arc;
//!
//! # async fn example(trainer: Arc<dyn annolab_core::Trainer>) -> anyhow::Result<()> {
//! let config = WorkbenchConfig::new("/var/lib/annolab/workspaces");
//! let workbench = Workbench::new(config, trainer);
//!
//! workbench.ensure_workspace("demo")?;
//! workbench
//!     .append_annotation("demo", Annotation::new("book a flight", "book_flight", vec![]))
//!     .await?;
//!
//! let report = workbench.retrain_workspace("demo", "both").await?;
//! println!("trained {} backends", report.results.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod accuracy;
pub mod annotations;
pub mod config;
pub mod error;
pub mod export;
pub mod review;
pub mod stats;
pub mod train;
pub mod types;
pub mod uncertain;
pub mod workbench;

// Re-exports for convenience
pub use accuracy::AccuracyStore;
pub use annotations::AnnotationRepository;
pub use config::WorkbenchConfig;
pub use error::{CoreError, TrainingError};
pub use export::{rasa_nlu_markup, write_rasa_nlu};
pub use review::apply_review;
pub use stats::compute_stats;
pub use train::{retrain, Trainer};
pub use types::{
    Annotation, BackendOutcome, EntitySpan, ModelHealth, ModelVersion, ModelVersions,
    RasaModelEntry, ReviewAction, ReviewOutcome, SampleState, TrainReport, TrainStatus,
    TrainingBackend, UncertainSample, WorkspaceStats,
};
pub use uncertain::UncertainQueue;
pub use workbench::Workbench;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the annotation workbench
    pub use crate::{
        Annotation, CoreError, EntitySpan, ReviewAction, TrainReport, Trainer, TrainingBackend,
        UncertainSample, Workbench, WorkbenchConfig, WorkspaceStats,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
