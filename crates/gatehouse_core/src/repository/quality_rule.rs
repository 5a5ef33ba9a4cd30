//! Quality rule repository: primary-hash CRUD, no secondary indexes.

use crate::error::{RepoError, RepoResult};
use crate::model::{QualityRule, QualityRuleRecord};
use crate::store::EntityStore;
use gatehouse_kv::KvBackend;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`QualityRule`] records.
#[derive(Debug, Clone)]
pub struct QualityRuleRepository {
    store: EntityStore<QualityRuleRecord>,
}

impl QualityRuleRepository {
    /// Creates a quality rule repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(backend),
        }
    }

    /// Persists a new rule.
    pub fn create(&self, rule: &QualityRule) -> RepoResult<QualityRule> {
        self.persist(rule)?;
        Ok(rule.clone())
    }

    /// Updates an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no rule with this id
    /// exists.
    pub fn update(&self, rule: &QualityRule) -> RepoResult<QualityRule> {
        if rule.id.is_empty() || !self.store.exists(&rule.id)? {
            return Err(RepoError::precondition_failed(format!(
                "no quality rule found with id [{}]",
                rule.id
            )));
        }
        self.persist(rule)?;
        Ok(rule.clone())
    }

    /// Point lookup by id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<QualityRule>> {
        self.store.get(id)?.map(QualityRule::try_from).transpose()
    }

    /// Every stored rule. Full scan.
    pub fn find_all(&self) -> RepoResult<Vec<QualityRule>> {
        self.store
            .all()?
            .into_iter()
            .map(QualityRule::try_from)
            .collect()
    }

    /// Deletes a rule by id. Idempotent.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        self.store.delete(id)?;
        debug!(quality_rule = %id, "deleted quality rule");
        Ok(())
    }

    fn persist(&self, rule: &QualityRule) -> RepoResult<()> {
        let record = QualityRuleRecord::from(rule);
        self.store.put(&record)?;
        debug!(quality_rule = %rule.id, "saved quality rule");
        Ok(())
    }
}
