//! # Gatehouse Core
//!
//! Management entity repositories for Gatehouse.
//!
//! Gatehouse persists its management entities (APIs, pages, groups,
//! memberships, API keys, quality rules, tokens, workflows) over a
//! key-value backend that only offers hashes and sets. This crate builds
//! the repository layer on top of [`gatehouse_kv`]:
//!
//! - [`store::EntityStore`] - generic CRUD over one primary hash per
//!   entity type, payloads serialized with `serde_json`
//! - [`index::IndexSet`] - set-backed secondary indexes, maintained by
//!   the repositories on every write
//! - [`model`] - domain structs and their storage records, converted at
//!   the boundary (millisecond timestamps, symbolic enum names, compound
//!   role tokens)
//! - [`repository`] - one repository per entity type with its fixed set
//!   of relationship and criteria queries
//!
//! ## Consistency
//!
//! Primary-hash and index writes are separate backend operations. A crash
//! between them leaves an index entry pointing at a missing record;
//! readers skip such entries with a warning instead of failing the query.
//!
//! ## Example
//!
//! ```rust
//! use gatehouse_core::repository::MembershipRepository;
//! use gatehouse_core::model::MembershipReferenceType;
//! use gatehouse_codec::RoleToken;
//! use gatehouse_kv::InMemoryBackend;
//! use std::sync::Arc;
//!
//! let repo = MembershipRepository::new(Arc::new(InMemoryBackend::new()));
//! let owner = RoleToken::new(1, "OWNER").unwrap();
//! repo.save_member(MembershipReferenceType::Api, "api-1", "alice", &owner)
//!     .unwrap();
//!
//! let mine = repo.find_by_user("alice").unwrap();
//! assert_eq!(mine.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod index;
pub mod model;
pub mod repository;
pub mod store;

pub use error::{RepoError, RepoResult};
