//! Error types for the storage layer

use std::path::PathBuf;

/// Errors raised by workspace and collection storage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Workspace id was empty or sanitized to empty
    #[error("invalid workspace id: {0:?}")]
    InvalidWorkspaceId(String),

    /// I/O failure while reading a storage file
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while writing a storage file
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File exists but does not parse as the expected JSON shape
    #[error("corrupt data in {}: {detail}", path.display())]
    Corrupt {
        /// File holding the unparseable data
        path: PathBuf,
        /// Parser diagnostic
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_display() {
        let err = StoreError::InvalidWorkspaceId("!!!".to_string());
        assert!(err.to_string().contains("invalid workspace id"));
    }

    #[test]
    fn corrupt_display_includes_path() {
        let err = StoreError::Corrupt {
            path: PathBuf::from("/tmp/annotations.json"),
            detail: "expected value".to_string(),
        };
        assert!(err.to_string().contains("annotations.json"));
    }
}
