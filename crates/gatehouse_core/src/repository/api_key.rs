//! API key repository: CRUD plus plan and subscription indexes.

use super::present;
use crate::error::{RepoError, RepoResult};
use crate::index::IndexSet;
use crate::model::{ApiKey, ApiKeyRecord};
use crate::store::EntityStore;
use gatehouse_kv::KvBackend;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`ApiKey`] records, keyed by the key string itself.
///
/// Two derived sets are maintained on every write:
///
/// - `apikey:plan:{plan}` - keys issued under one plan
/// - `apikey:subscription:{subscription}` - keys of one subscription
///
/// A key whose plan or subscription changes on update keeps its stale
/// entry in the old bucket; readers fetch records by id and so only pay
/// an extra lookup for it.
#[derive(Debug, Clone)]
pub struct ApiKeyRepository {
    store: EntityStore<ApiKeyRecord>,
    by_plan: IndexSet,
    by_subscription: IndexSet,
}

impl ApiKeyRepository {
    /// Creates an API key repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(Arc::clone(&backend)),
            by_plan: IndexSet::new(Arc::clone(&backend), "apikey:plan"),
            by_subscription: IndexSet::new(backend, "apikey:subscription"),
        }
    }

    /// Persists a new key.
    pub fn create(&self, api_key: &ApiKey) -> RepoResult<ApiKey> {
        self.persist(api_key)?;
        Ok(api_key.clone())
    }

    /// Updates an existing key.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if the key is not stored.
    pub fn update(&self, api_key: &ApiKey) -> RepoResult<ApiKey> {
        if api_key.key.is_empty() || !self.store.exists(&api_key.key)? {
            return Err(RepoError::precondition_failed(format!(
                "no api key found with key [{}]",
                api_key.key
            )));
        }
        self.persist(api_key)?;
        Ok(api_key.clone())
    }

    /// Point lookup by key. Absence is not an error.
    pub fn find_by_key(&self, key: &str) -> RepoResult<Option<ApiKey>> {
        self.store.get(key)?.map(ApiKey::try_from).transpose()
    }

    /// Keys issued under one plan, revoked and expired included.
    pub fn find_by_plan(&self, plan: &str) -> RepoResult<Vec<ApiKey>> {
        self.find_indexed(&self.by_plan, plan)
    }

    /// Keys belonging to one subscription.
    pub fn find_by_subscription(&self, subscription: &str) -> RepoResult<Vec<ApiKey>> {
        self.find_indexed(&self.by_subscription, subscription)
    }

    /// Deletes a key. Idempotent.
    ///
    /// The key is removed from both derived sets before the primary hash
    /// field is deleted.
    pub fn delete(&self, key: &str) -> RepoResult<()> {
        if let Some(record) = self.store.get(key)? {
            self.by_plan.remove(&record.plan, key)?;
            self.by_subscription.remove(&record.subscription, key)?;
        }
        self.store.delete(key)?;
        debug!(api_key = %key, "deleted api key");
        Ok(())
    }

    fn persist(&self, api_key: &ApiKey) -> RepoResult<()> {
        let record = ApiKeyRecord::from(api_key);
        self.store.put(&record)?;
        self.by_plan.add(&api_key.plan, &api_key.key)?;
        self.by_subscription
            .add(&api_key.subscription, &api_key.key)?;
        debug!(api_key = %api_key.key, "saved api key");
        Ok(())
    }

    fn find_indexed(&self, index: &IndexSet, key: &str) -> RepoResult<Vec<ApiKey>> {
        let mut ids = index.members(key)?;
        ids.sort_unstable();
        let records = present(&ids, self.store.multi_get(&ids)?);
        records.into_iter().map(ApiKey::try_from).collect()
    }
}
