//! API repository: CRUD, visibility index, membership-driven listing.

use super::{present, MembershipRepository};
use crate::error::{RepoError, RepoResult};
use crate::index::IndexSet;
use crate::model::{Api, ApiRecord, MembershipReferenceType, Visibility};
use crate::store::EntityStore;
use gatehouse_codec::{RoleToken, Symbol};
use gatehouse_kv::KvBackend;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`Api`] records.
///
/// Besides the primary hash, one derived set per visibility value is
/// maintained (`api:visibility:PUBLIC`, `api:visibility:PRIVATE`).
/// Visibility changes on update add the id to the new bucket without
/// removing it from the old one; readers fetch by id and filter on the
/// record's current visibility, so stale bucket entries only cost an
/// extra lookup.
#[derive(Debug, Clone)]
pub struct ApiRepository {
    store: EntityStore<ApiRecord>,
    by_visibility: IndexSet,
    memberships: Arc<MembershipRepository>,
}

impl ApiRepository {
    /// Creates an API repository over the given backend.
    ///
    /// Member-scoped listing resolves users through `memberships`.
    pub fn new(backend: Arc<dyn KvBackend>, memberships: Arc<MembershipRepository>) -> Self {
        Self {
            store: EntityStore::new(Arc::clone(&backend)),
            by_visibility: IndexSet::new(backend, "api:visibility"),
            memberships,
        }
    }

    /// Persists a new API.
    pub fn create(&self, api: &Api) -> RepoResult<Api> {
        self.persist(api)?;
        Ok(api.clone())
    }

    /// Updates an existing API.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no API with this id
    /// exists.
    pub fn update(&self, api: &Api) -> RepoResult<Api> {
        if api.id.is_empty() || !self.store.exists(&api.id)? {
            return Err(RepoError::precondition_failed(format!(
                "no api found with id [{}]",
                api.id
            )));
        }
        self.persist(api)?;
        Ok(api.clone())
    }

    /// Point lookup by id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Api>> {
        self.store.get(id)?.map(Api::try_from).transpose()
    }

    /// Fetches several APIs at once; missing ids are skipped.
    pub fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Api>> {
        let records = self.store.multi_get(ids)?;
        into_domain(present(ids, records))
    }

    /// Every stored API. Full scan.
    pub fn find_all(&self) -> RepoResult<Vec<Api>> {
        into_domain(self.store.all()?)
    }

    /// APIs with the given visibility, via the visibility index.
    pub fn find_by_visibility(&self, visibility: Visibility) -> RepoResult<Vec<Api>> {
        into_domain(self.records_by_visibility(visibility)?)
    }

    /// APIs visible to a member.
    ///
    /// With a `user`, the candidate set is the APIs the user holds a
    /// membership on (optionally narrowed to one `role`); without one, it
    /// is every API (or the visibility bucket when `visibility` is given).
    /// In both cases a `visibility` filter is applied on the records'
    /// current state.
    pub fn find_by_member(
        &self,
        user_id: Option<&str>,
        role: Option<&RoleToken>,
        visibility: Option<Visibility>,
    ) -> RepoResult<Vec<Api>> {
        let records = match user_id {
            Some(user_id) => {
                let memberships = self.memberships.find_by_user_and_reference_type_and_role(
                    user_id,
                    MembershipReferenceType::Api,
                    role,
                )?;
                let ids: Vec<String> = memberships
                    .into_iter()
                    .map(|m| m.reference_id)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                present(&ids, self.store.multi_get(&ids)?)
            }
            None => match visibility {
                Some(visibility) => self.records_by_visibility(visibility)?,
                None => self.store.all()?,
            },
        };
        let records = match visibility {
            Some(visibility) => {
                let name = visibility.as_name();
                records.into_iter().filter(|r| r.visibility == name).collect()
            }
            None => records,
        };
        into_domain(records)
    }

    /// Deletes an API by id. Idempotent.
    ///
    /// The id is removed from its visibility bucket before the primary
    /// hash field is deleted.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        if let Some(record) = self.store.get(id)? {
            self.by_visibility.remove(&record.visibility, id)?;
        }
        self.store.delete(id)?;
        debug!(api = %id, "deleted api");
        Ok(())
    }

    fn persist(&self, api: &Api) -> RepoResult<()> {
        let record = ApiRecord::from(api);
        self.store.put(&record)?;
        self.by_visibility.add(api.visibility.as_name(), &api.id)?;
        debug!(api = %api.id, "saved api");
        Ok(())
    }

    fn records_by_visibility(&self, visibility: Visibility) -> RepoResult<Vec<ApiRecord>> {
        let name = visibility.as_name();
        let mut ids = self.by_visibility.members(name)?;
        ids.sort_unstable();
        let records = present(&ids, self.store.multi_get(&ids)?);
        // Drop stale bucket entries left by visibility changes
        Ok(records.into_iter().filter(|r| r.visibility == name).collect())
    }
}

fn into_domain(records: Vec<ApiRecord>) -> RepoResult<Vec<Api>> {
    records.into_iter().map(Api::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_kv::InMemoryBackend;

    fn repositories() -> (ApiRepository, Arc<MembershipRepository>) {
        let backend: Arc<dyn KvBackend> = Arc::new(InMemoryBackend::new());
        let memberships = Arc::new(MembershipRepository::new(Arc::clone(&backend)));
        (
            ApiRepository::new(backend, Arc::clone(&memberships)),
            memberships,
        )
    }

    fn api(id: &str, visibility: Visibility) -> Api {
        Api {
            id: id.into(),
            name: id.to_uppercase(),
            version: "1.0".into(),
            description: String::new(),
            definition: None,
            visibility,
            lifecycle_state: None,
            api_lifecycle_state: None,
            picture: None,
            groups: None,
            views: None,
            labels: None,
            deployed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_find_by_id() {
        let (repo, _) = repositories();
        repo.create(&api("api-1", Visibility::Public)).unwrap();

        let found = repo.find_by_id("api-1").unwrap().unwrap();
        assert_eq!(found.name, "API-1");
        assert!(repo.find_by_id("api-404").unwrap().is_none());
    }

    #[test]
    fn update_missing_api_fails_precondition() {
        let (repo, _) = repositories();
        let result = repo.update(&api("api-1", Visibility::Public));
        assert!(matches!(result, Err(RepoError::PreconditionFailed { .. })));
    }

    #[test]
    fn find_by_visibility_uses_current_state() {
        let (repo, _) = repositories();
        repo.create(&api("pub-1", Visibility::Public)).unwrap();
        repo.create(&api("priv-1", Visibility::Private)).unwrap();

        let public = repo.find_by_visibility(Visibility::Public).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, "pub-1");

        // After flipping visibility the old bucket entry is stale but the
        // record filter hides it
        let mut flipped = api("pub-1", Visibility::Private);
        flipped.created_at = public[0].created_at;
        repo.update(&flipped).unwrap();
        assert!(repo.find_by_visibility(Visibility::Public).unwrap().is_empty());
        assert_eq!(repo.find_by_visibility(Visibility::Private).unwrap().len(), 2);
    }

    #[test]
    fn find_by_member_follows_memberships() {
        let (repo, memberships) = repositories();
        repo.create(&api("api-1", Visibility::Private)).unwrap();
        repo.create(&api("api-2", Visibility::Public)).unwrap();
        let owner = RoleToken::new(1, "OWNER").unwrap();
        memberships
            .save_member(MembershipReferenceType::Api, "api-1", "alice", &owner)
            .unwrap();

        let mine = repo.find_by_member(Some("alice"), None, None).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "api-1");

        // Role narrows the membership set
        let user = RoleToken::new(1, "USER").unwrap();
        assert!(repo
            .find_by_member(Some("alice"), Some(&user), None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn find_by_member_applies_visibility_filter() {
        let (repo, memberships) = repositories();
        repo.create(&api("api-1", Visibility::Private)).unwrap();
        repo.create(&api("api-2", Visibility::Public)).unwrap();
        let owner = RoleToken::new(1, "OWNER").unwrap();
        for id in ["api-1", "api-2"] {
            memberships
                .save_member(MembershipReferenceType::Api, id, "alice", &owner)
                .unwrap();
        }

        let public = repo
            .find_by_member(Some("alice"), None, Some(Visibility::Public))
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, "api-2");

        let private = repo
            .find_by_member(Some("alice"), None, Some(Visibility::Private))
            .unwrap();
        assert_eq!(private.len(), 1);
        assert_eq!(private[0].id, "api-1");
    }

    #[test]
    fn find_by_member_without_user_lists_by_visibility() {
        let (repo, _) = repositories();
        repo.create(&api("api-1", Visibility::Private)).unwrap();
        repo.create(&api("api-2", Visibility::Public)).unwrap();

        assert_eq!(repo.find_by_member(None, None, None).unwrap().len(), 2);
        let public = repo
            .find_by_member(None, None, Some(Visibility::Public))
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, "api-2");
    }

    #[test]
    fn delete_cleans_visibility_bucket() {
        let (repo, _) = repositories();
        repo.create(&api("api-1", Visibility::Public)).unwrap();

        repo.delete("api-1").unwrap();
        assert!(repo.find_by_id("api-1").unwrap().is_none());
        assert!(repo.find_by_visibility(Visibility::Public).unwrap().is_empty());

        repo.delete("api-1").unwrap();
    }

    #[test]
    fn find_by_ids_skips_missing() {
        let (repo, _) = repositories();
        repo.create(&api("api-1", Visibility::Public)).unwrap();

        let found = repo
            .find_by_ids(&["api-1".to_string(), "api-404".to_string()])
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
