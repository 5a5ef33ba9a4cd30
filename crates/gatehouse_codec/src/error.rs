//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while crossing the storage boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A stored compound key does not have the `"{scope}:{name}"` shape.
    #[error("malformed compound key: {token:?}")]
    MalformedCompoundKey {
        /// The offending token.
        token: String,
    },

    /// A stored enum value matches no known symbol.
    #[error("unknown {kind} value: {value:?}")]
    UnknownEnumValue {
        /// Name of the enumerated type.
        kind: &'static str,
        /// The stored string that failed to match.
        value: String,
    },
}

impl CodecError {
    /// Creates a malformed compound key error.
    pub fn malformed_compound_key(token: impl Into<String>) -> Self {
        Self::MalformedCompoundKey {
            token: token.into(),
        }
    }

    /// Creates an unknown enum value error.
    pub fn unknown_enum_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownEnumValue {
            kind,
            value: value.into(),
        }
    }
}
