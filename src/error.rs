//! Engine-level error type.
//!
//! Errors are recorded state polled via `DirEnumerator::last_error`, never
//! panics: a failing branch during recursive descent is abandoned while
//! iteration continues on its siblings.

use crate::volume::VolumeError;

/// Error taxonomy of the enumeration engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumeratorError {
    /// Path not found
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// The bulk tree-walk could not be opened
    TreeWalkOpenFailed(String),
    /// A name filter pattern failed to compile
    InvalidPattern(String),
    /// Opaque backend failure, with the native error code when known
    Backend { message: String, code: Option<i32> },
    /// The bounded wait for the root handle open elapsed
    Timeout,
    /// The session was cancelled
    Canceled,
}

impl std::fmt::Display for EnumeratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Path not found: {}", path),
            Self::PermissionDenied(path) => write!(f, "Permission denied: {}", path),
            Self::TreeWalkOpenFailed(msg) => write!(f, "Tree walk open failed: {}", msg),
            Self::InvalidPattern(pattern) => write!(f, "Invalid name filter: {}", pattern),
            Self::Backend { message, code: Some(code) } => {
                write!(f, "Backend error ({}): {}", code, message)
            }
            Self::Backend { message, code: None } => write!(f, "Backend error: {}", message),
            Self::Timeout => write!(f, "Timed out waiting for the listing to open"),
            Self::Canceled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for EnumeratorError {}

impl From<VolumeError> for EnumeratorError {
    fn from(err: VolumeError) -> Self {
        match err {
            VolumeError::NotFound(path) => Self::NotFound(path),
            VolumeError::PermissionDenied(path) => Self::PermissionDenied(path),
            VolumeError::NotSupported => Self::Backend {
                message: "operation not supported by this volume".to_string(),
                code: None,
            },
            VolumeError::Io { message, code } => Self::Backend { message, code },
        }
    }
}
