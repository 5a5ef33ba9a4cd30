//! Group repository: primary-hash CRUD, no secondary indexes.

use super::present;
use crate::error::{RepoError, RepoResult};
use crate::model::{Group, GroupRecord};
use crate::store::EntityStore;
use gatehouse_kv::KvBackend;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`Group`] records.
///
/// Groups are only ever fetched by id or listed wholesale, so the
/// primary hash is the whole storage footprint.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    store: EntityStore<GroupRecord>,
}

impl GroupRepository {
    /// Creates a group repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(backend),
        }
    }

    /// Persists a new group.
    pub fn create(&self, group: &Group) -> RepoResult<Group> {
        self.persist(group)?;
        Ok(group.clone())
    }

    /// Updates an existing group.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no group with this id
    /// exists.
    pub fn update(&self, group: &Group) -> RepoResult<Group> {
        if group.id.is_empty() || !self.store.exists(&group.id)? {
            return Err(RepoError::precondition_failed(format!(
                "no group found with id [{}]",
                group.id
            )));
        }
        self.persist(group)?;
        Ok(group.clone())
    }

    /// Point lookup by id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Group>> {
        self.store.get(id)?.map(Group::try_from).transpose()
    }

    /// Fetches several groups at once; missing ids are skipped.
    pub fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Group>> {
        let records = self.store.multi_get(ids)?;
        present(ids, records).into_iter().map(Group::try_from).collect()
    }

    /// Every stored group. Full scan.
    pub fn find_all(&self) -> RepoResult<Vec<Group>> {
        self.store.all()?.into_iter().map(Group::try_from).collect()
    }

    /// Deletes a group by id. Idempotent.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        self.store.delete(id)?;
        debug!(group = %id, "deleted group");
        Ok(())
    }

    fn persist(&self, group: &Group) -> RepoResult<()> {
        let record = GroupRecord::try_from(group)?;
        self.store.put(&record)?;
        debug!(group = %group.id, "saved group");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_kv::InMemoryBackend;

    fn repository() -> GroupRepository {
        GroupRepository::new(Arc::new(InMemoryBackend::new()))
    }

    fn group(id: &str) -> Group {
        Group {
            id: id.into(),
            name: id.to_uppercase(),
            event_rules: None,
            roles: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_find_by_id() {
        let repo = repository();
        repo.create(&group("g-1")).unwrap();

        assert!(repo.find_by_id("g-1").unwrap().is_some());
        assert!(repo.find_by_id("g-404").unwrap().is_none());
    }

    #[test]
    fn update_missing_group_fails_precondition() {
        let repo = repository();
        let result = repo.update(&group("g-1"));
        assert!(matches!(result, Err(RepoError::PreconditionFailed { .. })));
    }

    #[test]
    fn find_by_ids_skips_missing() {
        let repo = repository();
        repo.create(&group("g-1")).unwrap();
        repo.create(&group("g-2")).unwrap();

        let found = repo
            .find_by_ids(&["g-1".to_string(), "g-404".to_string(), "g-2".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn find_all_and_delete() {
        let repo = repository();
        repo.create(&group("g-1")).unwrap();
        repo.create(&group("g-2")).unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 2);

        repo.delete("g-1").unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 1);
        repo.delete("g-1").unwrap();
    }
}
