//! Set-backed secondary indexes.

use crate::error::RepoResult;
use gatehouse_kv::KvBackend;
use std::sync::Arc;

/// One secondary-index dimension, persisted as backend sets.
///
/// An `IndexSet` maps an index key (a plan id, a username, a
/// `"{type}:{id}"` reference pair) to the set of entity ids whose current
/// state matches that key. Buckets are named `"{prefix}:{key}"`.
///
/// Add and remove are idempotent; looking up a key with no bucket yields
/// an empty result, never an error.
///
/// Index writes are **not** atomic with the primary-hash write that
/// triggers them. A crash in between leaves a stale or missing membership
/// until the entity is next written or deleted; readers that fetch records
/// by indexed id tolerate misses.
#[derive(Clone)]
pub struct IndexSet {
    backend: Arc<dyn KvBackend>,
    prefix: String,
}

impl IndexSet {
    /// Creates an index over the given backend with a bucket-name prefix.
    pub fn new(backend: Arc<dyn KvBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    fn bucket(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Adds an entity id to the bucket for `key`. Idempotent.
    pub fn add(&self, key: &str, id: &str) -> RepoResult<()> {
        self.backend.set_add(&self.bucket(key), id)?;
        Ok(())
    }

    /// Removes an entity id from the bucket for `key`. Idempotent.
    pub fn remove(&self, key: &str, id: &str) -> RepoResult<()> {
        self.backend.set_remove(&self.bucket(key), id)?;
        Ok(())
    }

    /// Returns the entity ids currently in the bucket for `key`.
    pub fn members(&self, key: &str) -> RepoResult<Vec<String>> {
        Ok(self.backend.set_members(&self.bucket(key))?)
    }
}

impl std::fmt::Debug for IndexSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSet")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
