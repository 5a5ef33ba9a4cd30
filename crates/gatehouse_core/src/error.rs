//! Error types for Gatehouse core.

use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can occur in repository operations.
///
/// Point lookups of missing entities are **not** errors; they return
/// `None`/empty results. Update and targeted-delete preconditions raise
/// [`RepoError::PreconditionFailed`] explicitly.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Backend I/O failure. Not retried at this layer.
    #[error("storage error: {0}")]
    Storage(#[from] gatehouse_kv::StorageError),

    /// Stored data failed boundary decoding (compound keys, enum names).
    #[error("codec error: {0}")]
    Codec(#[from] gatehouse_codec::CodecError),

    /// A record payload failed to serialize or deserialize.
    #[error("record payload error: {0}")]
    Record(#[from] serde_json::Error),

    /// An operation's precondition does not hold.
    #[error("precondition failed: {message}")]
    PreconditionFailed {
        /// Description of the violated precondition.
        message: String,
    },
}

impl RepoError {
    /// Creates a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
        }
    }
}
