//! # Gatehouse KV
//!
//! Key-value backend trait and implementations for Gatehouse.
//!
//! This crate provides the lowest-level storage abstraction for Gatehouse.
//! Backends expose two named-key primitives and nothing else:
//!
//! - **Hashes**: field-to-payload maps, one field per entity id
//! - **Sets**: unordered member sets, used for secondary indexes
//!
//! Backends are **opaque payload stores** - they do not interpret the
//! bytes they hold. Gatehouse owns all record encoding.
//!
//! ## Design Principles
//!
//! - Each hash or set operation is atomic at single-key granularity
//! - No cross-key transactions, retries, or caching at this layer
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral deployments
//!
//! ## Example
//!
//! ```rust
//! use gatehouse_kv::{InMemoryBackend, KvBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.hash_put("apikey", "k-1", b"payload".to_vec()).unwrap();
//! let value = backend.hash_get("apikey", "k-1").unwrap();
//! assert_eq!(value, Some(b"payload".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;

pub use backend::KvBackend;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryBackend;
