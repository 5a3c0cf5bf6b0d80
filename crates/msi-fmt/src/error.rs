//! Error types of the format layer.

use std::sync::Arc;

use thiserror::Error;

/// Errors from the stream-name codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The name cannot be represented as a compound-file stream name,
    /// e.g. it contains code points reserved for the escape ranges.
    #[error("invalid stream name: {0:?}")]
    InvalidStreamName(String),

    /// The encoded form exceeds the 31 code-unit stream-name limit.
    #[error("stream name too long: {0:?}")]
    NameTooLong(String),
}

/// Errors from the string pool.
///
/// Index errors are raised at row-decode time, not at pool load time.
#[derive(Debug, Clone, Error)]
pub enum PoolError {
    #[error("string pool read failed: {0}")]
    Io(#[source] Arc<std::io::Error>),

    /// The `_StringPool` stream ends in the middle of a descriptor.
    #[error("string pool descriptors truncated")]
    Truncated,

    /// The descriptor lengths do not add up to the `_StringData` size.
    #[error("string data size mismatch: descriptors cover {expected} bytes, stream has {actual}")]
    DataSizeMismatch { expected: u64, actual: u64 },

    #[error("unsupported codepage {0}")]
    InvalidCodepage(u32),

    #[error("string reference {index} out of range (pool holds {len} entries)")]
    IndexOutOfRange { index: u32, len: usize },
}

impl From<std::io::Error> for PoolError {
    fn from(err: std::io::Error) -> Self {
        PoolError::Io(Arc::new(err))
    }
}

impl From<binrw::Error> for PoolError {
    fn from(err: binrw::Error) -> Self {
        PoolError::Io(Arc::new(std::io::Error::other(err)))
    }
}
