//! Generic hash-backed entity store.

use crate::error::RepoResult;
use gatehouse_kv::KvBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// A storage record: one entity type persisted in one primary hash.
///
/// Records are the storage-side representation of an entity (millisecond
/// timestamps, symbolic enum names, compound role tokens). Each record
/// type owns a primary hash named [`Record::HASH_KEY`], keyed by entity id.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the primary hash holding records of this type.
    const HASH_KEY: &'static str;

    /// Returns the primary id of this record.
    fn id(&self) -> &str;
}

/// Generic storage for one record type over the primary hash.
///
/// `EntityStore<R>` provides the four primitive operations every entity
/// type shares: point lookup, full-overwrite upsert, idempotent delete,
/// and full scan. Secondary-index maintenance and relationship queries
/// live in the repositories, not here.
pub struct EntityStore<R: Record> {
    backend: Arc<dyn KvBackend>,
    _marker: PhantomData<R>,
}

impl<R: Record> EntityStore<R> {
    /// Creates a store over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            _marker: PhantomData,
        }
    }

    /// Gets a record by id.
    ///
    /// Returns `None` if the record doesn't exist; absence is not an error.
    pub fn get(&self, id: &str) -> RepoResult<Option<R>> {
        match self.backend.hash_get(R::HASH_KEY, id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Upserts a record, fully overwriting any previous value.
    pub fn put(&self, record: &R) -> RepoResult<()> {
        let bytes = serde_json::to_vec(record)?;
        self.backend.hash_put(R::HASH_KEY, record.id(), bytes)?;
        Ok(())
    }

    /// Deletes a record by id. Idempotent.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        self.backend.hash_delete(R::HASH_KEY, id)?;
        Ok(())
    }

    /// Checks if a record exists.
    pub fn exists(&self, id: &str) -> RepoResult<bool> {
        Ok(self.backend.hash_get(R::HASH_KEY, id)?.is_some())
    }

    /// Returns every stored record.
    ///
    /// **Warning**: full scan; cost proportional to the store size. Fine
    /// for a management plane, not a data plane.
    pub fn all(&self) -> RepoResult<Vec<R>> {
        let entries = self.backend.hash_entries(R::HASH_KEY)?;
        let mut records = Vec::with_capacity(entries.len());
        for (_, bytes) in entries {
            records.push(serde_json::from_slice(&bytes)?);
        }
        Ok(records)
    }

    /// Fetches several records at once.
    ///
    /// The result preserves positional correspondence with `ids`; missing
    /// ids map to `None`, which the caller filters or handles.
    pub fn multi_get(&self, ids: &[String]) -> RepoResult<Vec<Option<R>>> {
        let values = self.backend.hash_multi_get(R::HASH_KEY, ids)?;
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            records.push(match value {
                Some(bytes) => Some(serde_json::from_slice(&bytes)?),
                None => None,
            });
        }
        Ok(records)
    }
}

impl<R: Record> Clone for EntityStore<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _marker: PhantomData,
        }
    }
}

impl<R: Record> std::fmt::Debug for EntityStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("hash_key", &R::HASH_KEY)
            .finish_non_exhaustive()
    }
}
