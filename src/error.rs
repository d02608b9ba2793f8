//! Error types for mftscope
//!
//! Two layers: `MftError` for anything that concerns a whole run or a whole
//! record, and `AttributeError` for failures scoped to a single attribute.
//! An `AttributeError` never escapes the record decoder; it only turns the
//! affected attribute into "absent".

use thiserror::Error;

/// Main error type for mftscope operations
#[derive(Error, Debug)]
pub enum MftError {
    #[error("Buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    #[error("Invalid MFT record at index {0}: {1}")]
    InvalidMftRecord(u64, String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for mftscope operations
pub type Result<T> = std::result::Result<T, MftError>;

impl MftError {
    /// Check if this error is recoverable (the run can continue with the next record)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MftError::BufferTooSmall { .. } | MftError::InvalidMftRecord(_, _)
        )
    }
}

/// Failure while decoding one attribute
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("read of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds { offset: usize, width: usize, len: usize },

    #[error("{what} too short: need {need} bytes, got {got}")]
    TooShort {
        what: &'static str,
        need: usize,
        got: usize,
    },

    #[error("{0} must be resident")]
    NotResident(&'static str),

    #[error("{0} must be non-resident")]
    NotNonResident(&'static str),

    #[error("invalid UTF-16: {0}")]
    InvalidUtf16(String),

    #[error("{0}")]
    Malformed(String),
}

/// Result type for attribute-scoped decoding
pub type AttrResult<T> = std::result::Result<T, AttributeError>;
