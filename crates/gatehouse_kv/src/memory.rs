//! In-memory key-value backend for testing.

use crate::backend::KvBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

/// An in-memory key-value backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral deployments that don't need persistence
///
/// Hash fields are kept in a `BTreeMap` so that `hash_entries` scans in a
/// stable (field-sorted) order; set membership is unordered.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. Each
/// operation takes the lock once, so individual operations are atomic;
/// sequences of operations are not.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    hashes: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all hashes and sets.
    pub fn clear(&self) {
        self.hashes.write().clear();
        self.sets.write().clear();
    }

    /// Returns the number of fields in a hash.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn hash_len(&self, key: &str) -> usize {
        self.hashes.read().get(key).map_or(0, BTreeMap::len)
    }

    /// Returns the number of members in a set.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn set_len(&self, key: &str) -> usize {
        self.sets.read().get(key).map_or(0, HashSet::len)
    }
}

impl KvBackend for InMemoryBackend {
    fn hash_get(&self, key: &str, field: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .hashes
            .read()
            .get(key)
            .and_then(|h| h.get(field))
            .cloned())
    }

    fn hash_put(&self, key: &str, field: &str, value: Vec<u8>) -> StorageResult<()> {
        self.hashes
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    fn hash_delete(&self, key: &str, field: &str) -> StorageResult<()> {
        let mut hashes = self.hashes.write();
        if let Some(hash) = hashes.get_mut(key) {
            hash.remove(field);
            if hash.is_empty() {
                hashes.remove(key);
            }
        }
        Ok(())
    }

    fn hash_entries(&self, key: &str) -> StorageResult<Vec<(String, Vec<u8>)>> {
        Ok(self
            .hashes
            .read()
            .get(key)
            .map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn hash_multi_get(&self, key: &str, fields: &[String]) -> StorageResult<Vec<Option<Vec<u8>>>> {
        let hashes = self.hashes.read();
        let hash = hashes.get(key);
        Ok(fields
            .iter()
            .map(|f| hash.and_then(|h| h.get(f)).cloned())
            .collect())
    }

    fn set_add(&self, key: &str, member: &str) -> StorageResult<()> {
        self.sets
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    fn set_remove(&self, key: &str, member: &str) -> StorageResult<()> {
        let mut sets = self.sets.write();
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                sets.remove(key);
            }
        }
        Ok(())
    }

    fn set_members(&self, key: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .sets
            .read()
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }
}
