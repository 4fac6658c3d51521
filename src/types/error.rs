//! Error types for twofold

use std::path::PathBuf;
use thiserror::Error;

/// Error type for scan, plan and execution operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source root missing or not a directory
    #[error("Source folder not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Destination root missing or not a directory
    #[error("Destination folder not found: {}", .0.display())]
    DestinationNotFound(PathBuf),

    /// Source and destination are the same folder
    #[error("Source and destination are the same folder: {}", .0.display())]
    SameFolder(PathBuf),

    /// No plan available; a scan must run first
    #[error("No plan available: run a scan first")]
    NoPlan,

    /// Plan index out of range
    #[error("Operation index {0} is out of range")]
    IndexOutOfRange(usize),

    /// Anchors carry no effect, so there is nothing to forbid
    #[error("Equal-entries anchor at index {0} cannot be forbidden")]
    ForbidAnchor(usize),

    /// Ambiguous Replace attempted without resolving the ambiguity
    #[error("Replace of {} is ambiguous: resolve it before executing", .path.display())]
    AmbiguousReplace { path: PathBuf },

    /// Scan or execution aborted through the cancellation token
    #[error("Cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Errors raised by scan preconditions before any plan is built.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SyncError::SourceNotFound(_)
                | SyncError::DestinationNotFound(_)
                | SyncError::SameFolder(_)
        )
    }

    /// Errors caused by plan state rather than the filesystem.
    pub fn is_plan_error(&self) -> bool {
        matches!(
            self,
            SyncError::NoPlan
                | SyncError::IndexOutOfRange(_)
                | SyncError::ForbidAnchor(_)
                | SyncError::AmbiguousReplace { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_automatic_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "gone");
        let err: SyncError = io_error.into();

        assert!(matches!(err, SyncError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(SyncError::SourceNotFound(PathBuf::from("/a")).is_precondition());
        assert!(SyncError::DestinationNotFound(PathBuf::from("/b")).is_precondition());
        assert!(SyncError::SameFolder(PathBuf::from("/a")).is_precondition());
        assert!(!SyncError::Cancelled.is_precondition());
    }

    #[test]
    fn test_plan_error_classification() {
        assert!(SyncError::NoPlan.is_plan_error());
        assert!(SyncError::IndexOutOfRange(7).is_plan_error());
        assert!(SyncError::ForbidAnchor(2).is_plan_error());
        assert!(!SyncError::Cancelled.is_plan_error());
    }

    #[test]
    fn test_display_includes_path() {
        let err = SyncError::AmbiguousReplace {
            path: PathBuf::from("/dest/a.txt"),
        };
        assert!(err.to_string().contains("/dest/a.txt"));
    }

    #[test]
    fn test_result_propagation() {
        fn inner() -> Result<(), SyncError> {
            Err(SyncError::NoPlan)
        }

        fn outer() -> Result<(), SyncError> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer().unwrap_err(), SyncError::NoPlan));
    }
}
