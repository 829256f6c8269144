//! Timetable store error types.

use std::path::PathBuf;

/// Errors that can occur when reading or writing stored timetables.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored content is not a list of time strings
    #[error("malformed timetable file {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },

    /// Timetable could not be encoded
    #[error("failed to serialize timetable: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }
}
