//! Exact-name round-trips for enumerated fields.

use crate::error::CodecResult;

/// A type stored as its symbolic name string.
///
/// Enumerated fields (visibility, lifecycle states, page types, ...) are
/// persisted as the exact variant name. Decoding matches by exact name and
/// fails with [`crate::CodecError::UnknownEnumValue`] when the stored
/// string matches no symbol; there is no coercion or fallback.
pub trait Symbol: Sized {
    /// Returns the symbolic name of this value.
    fn as_name(&self) -> &'static str;

    /// Resolves a stored name back to a value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CodecError::UnknownEnumValue`] if `name` matches
    /// no symbol.
    fn from_name(name: &str) -> CodecResult<Self>;
}
