//! Key-value backend trait definition.

use crate::error::StorageResult;

/// A low-level key-value backend for Gatehouse.
///
/// Backends expose named **hashes** (field-map) and **sets**. Gatehouse
/// stores one entity type per hash, keyed by entity id, and one derived
/// index bucket per set key.
///
/// # Invariants
///
/// - Each individual operation is atomic: it either completes or fails
///   without partial effect on its key
/// - `hash_multi_get` preserves positional correspondence with the input
///   fields; missing fields map to `None`
/// - Set add/remove are idempotent
/// - Backends must be `Send + Sync` for concurrent access
///
/// Sequences of operations are **not** atomic across keys. A writer that
/// updates a hash and then one or more index sets can be interrupted in
/// between; readers tolerate the resulting drift.
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing and ephemeral deployments
pub trait KvBackend: Send + Sync {
    /// Reads one field from a hash.
    ///
    /// Returns `None` if the hash or the field does not exist.
    fn hash_get(&self, key: &str, field: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Writes one field of a hash, replacing any previous value.
    fn hash_put(&self, key: &str, field: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Deletes one field from a hash.
    ///
    /// Deleting a missing field is not an error.
    fn hash_delete(&self, key: &str, field: &str) -> StorageResult<()>;

    /// Returns every `(field, value)` entry of a hash.
    ///
    /// Cost is proportional to the hash size.
    fn hash_entries(&self, key: &str) -> StorageResult<Vec<(String, Vec<u8>)>>;

    /// Reads several fields from a hash at once.
    ///
    /// The result has the same length and order as `fields`; a missing
    /// field yields `None` at its position.
    fn hash_multi_get(&self, key: &str, fields: &[String]) -> StorageResult<Vec<Option<Vec<u8>>>>;

    /// Adds a member to a set. Idempotent.
    fn set_add(&self, key: &str, member: &str) -> StorageResult<()>;

    /// Removes a member from a set. Idempotent.
    fn set_remove(&self, key: &str, member: &str) -> StorageResult<()>;

    /// Returns all members of a set.
    ///
    /// Returns an empty vec if the set does not exist.
    fn set_members(&self, key: &str) -> StorageResult<Vec<String>>;
}
