//! Error types for capture decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for capture operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Header version does not match the protocol revision the caller expects
    #[error("Protocol version mismatch: expected {expected}, found {found}")]
    ProtocolVersionMismatch { expected: i32, found: i32 },

    /// A read ran past the end of the capture buffer
    #[error("Buffer overflow at offset {offset} (buffer length {len})")]
    BufferOverflow { offset: usize, len: usize },

    /// Skeleton hierarchy is malformed
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// A joint's parent index exceeds the configured rig size
    #[error("Joint {joint} has parent {parent} outside the rig limit of {limit}")]
    JointLimitExceeded { joint: usize, parent: i32, limit: usize },

    /// Joint index out of bounds
    #[error("Joint index {index} out of bounds (count: {count})")]
    JointOutOfBounds { index: usize, count: usize },

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// Configuration could not be applied
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid skeleton error.
    pub fn invalid_skeleton(msg: impl Into<String>) -> Self {
        Self::InvalidSkeleton(msg.into())
    }

    /// True for errors after which the buffer must not be decoded further.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProtocolVersionMismatch { .. } | Self::BufferOverflow { .. })
    }
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::ProtocolVersionMismatch { expected: 202005, found: 202004 };
        assert!(e.to_string().contains("202005"));
        assert!(e.to_string().contains("202004"));

        let e = Error::JointLimitExceeded { joint: 3, parent: 40, limit: 21 };
        assert!(e.to_string().contains("40"));
        assert!(e.to_string().contains("21"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(Error::BufferOverflow { offset: 4, len: 2 }.is_fatal());
        assert!(!Error::invalid_skeleton("cycle").is_fatal());
    }
}
