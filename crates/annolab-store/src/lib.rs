//! Annolab Storage Layer
//!
//! Workspace-scoped JSON storage for annotation projects.
//!
//! # Core Concepts
//!
//! - [`WorkspaceId`]: sanitized workspace identifier (alphanumeric, `-`, `_`)
//! - [`WorkspaceStore`]: creates and resolves per-workspace directory trees
//! - [`WorkspacePaths`]: the canonical file layout inside one workspace
//! - [`JsonDocument<T>`]: typed whole-file JSON store with atomic rewrites
//! - [`LoadOutcome`]: distinguishes "no data yet" from "data unreadable"
//!
//! Every collection is a single JSON file rewritten wholesale on mutation.
//! Writers must be serialized externally (the core crate holds a
//! per-workspace mutex around mutating operations).

#![warn(unreachable_pub)]

mod collection;
mod error;
mod workspace;

pub use collection::{JsonDocument, LoadOutcome};
pub use error::StoreError;
pub use workspace::{WorkspaceId, WorkspacePaths, WorkspaceStore};
