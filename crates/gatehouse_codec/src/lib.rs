//! # Gatehouse Codec
//!
//! Storage-boundary codecs for Gatehouse.
//!
//! Everything Gatehouse persists is scalar-shaped: record payloads are
//! serialized field maps, and composite values are flattened into opaque
//! strings. This crate owns the flattening rules:
//!
//! - [`RoleToken`] - the `"{scope}:{name}"` compound key used for role and
//!   membership-type identity
//! - [`Symbol`] - exact-name round-trips for enumerated fields
//! - [`millis`] - millisecond-epoch timestamp conversions
//!
//! Tokens are validated on both ends: a [`RoleToken`] can never be built
//! with a name containing the separator, and decoding a stored token that
//! does not match the expected shape fails with
//! [`CodecError::MalformedCompoundKey`] instead of erroring later inside a
//! filter predicate.
//!
//! ## Usage
//!
//! ```
//! use gatehouse_codec::RoleToken;
//!
//! let token = RoleToken::new(2, "OWNER").unwrap();
//! assert_eq!(token.encode(), "2:OWNER");
//!
//! let decoded = RoleToken::decode("2:OWNER").unwrap();
//! assert_eq!(decoded, token);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod millis;
mod role;
mod symbol;

pub use error::{CodecError, CodecResult};
pub use role::RoleToken;
pub use symbol::Symbol;
