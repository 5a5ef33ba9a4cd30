//! Compound role token codec.

use crate::error::{CodecError, CodecResult};
use std::fmt;
use std::str::FromStr;

/// Separator between scope and name in the encoded form.
const SEPARATOR: char = ':';

/// A role identity: an integer scope paired with a role name.
///
/// Roles are stored and indexed as the single opaque string
/// `"{scope}:{name}"`. Inside the process the two halves stay a tagged
/// pair; the flattened form exists only at the storage boundary.
///
/// # Validation
///
/// [`RoleToken::new`] rejects names containing the separator, so a token
/// that would decode ambiguously can never be written. [`RoleToken::decode`]
/// rejects any stored string that does not split into exactly an integer
/// scope and a non-empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleToken {
    scope: i32,
    name: String,
}

impl RoleToken {
    /// Creates a role token.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedCompoundKey`] if `name` is empty or
    /// contains the separator.
    pub fn new(scope: i32, name: impl Into<String>) -> CodecResult<Self> {
        let name = name.into();
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(CodecError::malformed_compound_key(format!(
                "{scope}{SEPARATOR}{name}"
            )));
        }
        Ok(Self { scope, name })
    }

    /// Returns the role scope.
    #[must_use]
    pub const fn scope(&self) -> i32 {
        self.scope
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encodes the token into its storage form, `"{scope}:{name}"`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.scope, SEPARATOR, self.name)
    }

    /// Decodes a stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedCompoundKey`] if the token does not
    /// split into exactly two parts, if the left part does not parse as an
    /// integer, or if the name part is empty.
    pub fn decode(token: &str) -> CodecResult<Self> {
        let mut parts = token.splitn(3, SEPARATOR);
        let (scope, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(scope), Some(name), None) => (scope, name),
            _ => return Err(CodecError::malformed_compound_key(token)),
        };
        let scope: i32 = scope
            .parse()
            .map_err(|_| CodecError::malformed_compound_key(token))?;
        if name.is_empty() {
            return Err(CodecError::malformed_compound_key(token));
        }
        Ok(Self {
            scope,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RoleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, SEPARATOR, self.name)
    }
}

impl FromStr for RoleToken {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
