//! Error types for the asset graph library.

use thiserror::Error;

/// Main error type for decoding, encoding and resolving serialized assets.
#[derive(Error, Debug)]
pub enum Error {
    /// Read past the end of the cursor's buffer
    #[error("Read of {needed} bytes at position {pos} exceeds buffer length {len}")]
    OutOfBounds { pos: usize, needed: usize, len: usize },

    /// Buffer too small to hold the fixed file header
    #[error("Truncated header: {0} bytes available")]
    TruncatedHeader(usize),

    /// Container format number outside the readable range
    #[error("Unsupported container format: {0}")]
    UnsupportedFormat(u32),

    /// Engine revision with no layout rule
    #[error("Unsupported engine revision: {0}")]
    UnsupportedRevision(String),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Directory entry whose byte range lies outside the buffer
    #[error("Object {path_id} range {start}+{size} lies outside buffer of {len} bytes")]
    EntryOutOfRange { path_id: i64, start: u64, size: u64, len: usize },

    /// Two directory entries with the same path id
    #[error("Duplicate path id: {0}")]
    DuplicatePathId(i64),

    /// Object not found by path id
    #[error("Object not found: {0}")]
    ObjectNotFound(i64),

    /// File not found in the collection
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Handle issued before the owning collection was reset
    #[error("Handle was invalidated by a collection reset")]
    Invalidated,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type alias for asset graph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::OutOfBounds { pos: 12, needed: 4, len: 14 };
        let msg = e.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("14"));

        let e = Error::UnsupportedFormat(7);
        assert!(e.to_string().contains('7'));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
