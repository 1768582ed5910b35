//! Workbench configuration
//!
//! Everything that used to be ambient process state (the workspaces root,
//! the placeholder accuracy range) is explicit configuration so multiple
//! instances can run with isolated state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Workbench configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Root directory holding all workspace subtrees
    pub workspaces_root: PathBuf,
    /// Lower bound of the placeholder accuracy scalar
    pub accuracy_floor: f64,
    /// Upper bound of the placeholder accuracy scalar
    pub accuracy_ceiling: f64,
}

impl WorkbenchConfig {
    /// Configuration rooted at `workspaces_root` with default bounds
    #[inline]
    #[must_use]
    pub fn new(workspaces_root: impl Into<PathBuf>) -> Self {
        Self {
            workspaces_root: workspaces_root.into(),
            ..Self::default()
        }
    }

    /// With a custom accuracy range
    #[inline]
    #[must_use]
    pub fn with_accuracy_range(mut self, floor: f64, ceiling: f64) -> Self {
        self.accuracy_floor = floor;
        self.accuracy_ceiling = ceiling;
        self
    }
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            workspaces_root: PathBuf::from("workspaces"),
            accuracy_floor: 60.0,
            accuracy_ceiling: 90.0,
        }
    }
}
