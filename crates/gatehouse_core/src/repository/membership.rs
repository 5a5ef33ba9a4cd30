//! Membership repository: the user/reference relation and its queries.

use super::present;
use crate::error::{RepoError, RepoResult};
use crate::index::IndexSet;
use crate::model::{membership_id, Membership, MembershipRecord, MembershipReferenceType};
use crate::store::EntityStore;
use chrono::Utc;
use gatehouse_codec::{RoleToken, Symbol};
use gatehouse_kv::KvBackend;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Repository for [`Membership`] records.
///
/// The primary hash field id is the composed triple
/// `"{user}:{referenceType}:{referenceId}"`, so the triple-uniqueness
/// invariant holds by construction: writing the same triple twice
/// overwrites one hash field. Two derived sets are maintained on every
/// write:
///
/// - `membership:user:{user}` - the user's membership ids
/// - `membership:reference:{type}:{id}` - ids attached to one reference
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    store: EntityStore<MembershipRecord>,
    by_user: IndexSet,
    by_reference: IndexSet,
}

fn reference_key(reference_type: MembershipReferenceType, reference_id: &str) -> String {
    format!("{}:{reference_id}", reference_type.as_name())
}

impl MembershipRepository {
    /// Creates a membership repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(Arc::clone(&backend)),
            by_user: IndexSet::new(Arc::clone(&backend), "membership:user"),
            by_reference: IndexSet::new(backend, "membership:reference"),
        }
    }

    /// Upserts a membership, keyed by its triple.
    pub fn create(&self, membership: &Membership) -> RepoResult<Membership> {
        self.persist(membership)?;
        Ok(membership.clone())
    }

    /// Updates an existing membership.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no membership exists
    /// for the triple, or if any triple component is empty.
    pub fn update(&self, membership: &Membership) -> RepoResult<Membership> {
        if membership.user_id.is_empty() || membership.reference_id.is_empty() {
            return Err(RepoError::precondition_failed(
                "membership to update must have a user id, a reference id and type",
            ));
        }
        if !self.store.exists(&membership.id())? {
            return Err(RepoError::precondition_failed(format!(
                "no membership found with user id [{}], reference type [{}] and id [{}]",
                membership.user_id,
                membership.reference_type.as_name(),
                membership.reference_id
            )));
        }
        self.persist(membership)?;
        Ok(membership.clone())
    }

    /// Deletes one membership by its triple. No-op if absent.
    ///
    /// The id is removed from both derived sets before the primary hash
    /// field is deleted.
    pub fn delete(
        &self,
        user_id: &str,
        reference_type: MembershipReferenceType,
        reference_id: &str,
    ) -> RepoResult<()> {
        let id = membership_id(user_id, reference_type, reference_id);
        self.by_user.remove(user_id, &id)?;
        self.by_reference
            .remove(&reference_key(reference_type, reference_id), &id)?;
        self.store.delete(&id)?;
        debug!(membership = %id, "deleted membership");
        Ok(())
    }

    /// Deletes every membership attached to one reference.
    pub fn delete_members(
        &self,
        reference_type: MembershipReferenceType,
        reference_id: &str,
    ) -> RepoResult<()> {
        let records =
            self.records_by_references(reference_type, std::slice::from_ref(&reference_id))?;
        for record in records {
            self.delete(&record.user_id, reference_type, &record.reference_id)?;
        }
        Ok(())
    }

    /// Point lookup by triple. Absence is not an error.
    pub fn find_by_id(
        &self,
        user_id: &str,
        reference_type: MembershipReferenceType,
        reference_id: &str,
    ) -> RepoResult<Option<Membership>> {
        let id = membership_id(user_id, reference_type, reference_id);
        self.store.get(&id)?.map(Membership::try_from).transpose()
    }

    /// All memberships of one user.
    pub fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Membership>> {
        into_domain(self.records_by_user(user_id)?)
    }

    /// A user's memberships of the given references.
    pub fn find_by_ids(
        &self,
        user_id: &str,
        reference_type: MembershipReferenceType,
        reference_ids: &[String],
    ) -> RepoResult<Vec<Membership>> {
        let ids: Vec<String> = reference_ids
            .iter()
            .map(|r| membership_id(user_id, reference_type, r))
            .collect();
        let records = self.store.multi_get(&ids)?;
        into_domain(present(&ids, records))
    }

    /// Memberships attached to one reference, optionally filtered by role.
    pub fn find_by_reference_and_role(
        &self,
        reference_type: MembershipReferenceType,
        reference_id: &str,
        role: Option<&RoleToken>,
    ) -> RepoResult<Vec<Membership>> {
        self.find_by_references_and_role(
            reference_type,
            std::slice::from_ref(&reference_id),
            role,
        )
    }

    /// Union of memberships attached to any of the references, optionally
    /// filtered to records carrying the encoded role token.
    pub fn find_by_references_and_role(
        &self,
        reference_type: MembershipReferenceType,
        reference_ids: &[&str],
        role: Option<&RoleToken>,
    ) -> RepoResult<Vec<Membership>> {
        let records = self.records_by_references(reference_type, reference_ids)?;
        into_domain(filter_by_role(records, role))
    }

    /// One user's memberships of one reference kind.
    pub fn find_by_user_and_reference_type(
        &self,
        user_id: &str,
        reference_type: MembershipReferenceType,
    ) -> RepoResult<Vec<Membership>> {
        self.find_by_user_and_reference_type_and_role(user_id, reference_type, None)
    }

    /// One user's memberships of one reference kind, optionally filtered
    /// by role.
    pub fn find_by_user_and_reference_type_and_role(
        &self,
        user_id: &str,
        reference_type: MembershipReferenceType,
        role: Option<&RoleToken>,
    ) -> RepoResult<Vec<Membership>> {
        let kind = reference_type.as_name();
        let records = self
            .records_by_user(user_id)?
            .into_iter()
            .filter(|r| r.reference_type == kind)
            .collect();
        into_domain(filter_by_role(records, role))
    }

    /// Every membership carrying the role, across all references.
    ///
    /// Full scan over the membership hash; control-plane cost only.
    pub fn find_by_role(&self, role: &RoleToken) -> RepoResult<Vec<Membership>> {
        let token = role.encode();
        let records = self
            .store
            .all()?
            .into_iter()
            .filter(|r| r.has_role_token(&token))
            .collect();
        into_domain(records)
    }

    /// Grants `role` to `user_id` on one reference, replacing any prior
    /// grant.
    ///
    /// Equality is by `(reference, user)` only: an existing record keeps
    /// its `created_at` but has its **whole** role map overwritten with
    /// the single given role and its `updated_at` bumped. A user therefore
    /// holds at most one role per reference through this path; multi-scope
    /// grants go through [`MembershipRepository::create`].
    pub fn save_member(
        &self,
        reference_type: MembershipReferenceType,
        reference_id: &str,
        user_id: &str,
        role: &RoleToken,
    ) -> RepoResult<Membership> {
        let now = Utc::now();
        let roles = BTreeMap::from([(role.scope(), role.name().to_string())]);
        let membership = match self.find_by_id(user_id, reference_type, reference_id)? {
            Some(mut existing) => {
                existing.roles = roles;
                existing.updated_at = now;
                existing
            }
            None => Membership {
                user_id: user_id.to_string(),
                reference_type,
                reference_id: reference_id.to_string(),
                roles,
                created_at: now,
                updated_at: now,
            },
        };
        self.persist(&membership)?;
        Ok(membership)
    }

    /// Revokes a user's membership of one reference. No-op if absent.
    pub fn delete_member(
        &self,
        reference_type: MembershipReferenceType,
        reference_id: &str,
        user_id: &str,
    ) -> RepoResult<()> {
        self.delete(user_id, reference_type, reference_id)
    }

    fn persist(&self, membership: &Membership) -> RepoResult<()> {
        let record = MembershipRecord::try_from(membership)?;
        self.store.put(&record)?;
        self.by_user.add(&membership.user_id, &record.id)?;
        self.by_reference.add(
            &reference_key(membership.reference_type, &membership.reference_id),
            &record.id,
        )?;
        debug!(membership = %record.id, "saved membership");
        Ok(())
    }

    fn records_by_user(&self, user_id: &str) -> RepoResult<Vec<MembershipRecord>> {
        let ids = self.by_user.members(user_id)?;
        let records = self.store.multi_get(&ids)?;
        Ok(present(&ids, records))
    }

    fn records_by_references(
        &self,
        reference_type: MembershipReferenceType,
        reference_ids: &[&str],
    ) -> RepoResult<Vec<MembershipRecord>> {
        let mut ids = BTreeSet::new();
        for reference_id in reference_ids {
            ids.extend(
                self.by_reference
                    .members(&reference_key(reference_type, reference_id))?,
            );
        }
        let ids: Vec<String> = ids.into_iter().collect();
        let records = self.store.multi_get(&ids)?;
        Ok(present(&ids, records))
    }
}

fn filter_by_role(
    records: Vec<MembershipRecord>,
    role: Option<&RoleToken>,
) -> Vec<MembershipRecord> {
    match role {
        Some(role) => {
            let token = role.encode();
            records
                .into_iter()
                .filter(|r| r.has_role_token(&token))
                .collect()
        }
        None => records,
    }
}

fn into_domain(records: Vec<MembershipRecord>) -> RepoResult<Vec<Membership>> {
    records.into_iter().map(Membership::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_kv::InMemoryBackend;

    fn repository() -> MembershipRepository {
        MembershipRepository::new(Arc::new(InMemoryBackend::new()))
    }

    fn membership(user: &str, reference_id: &str, scope: i32, role: &str) -> Membership {
        Membership {
            user_id: user.into(),
            reference_type: MembershipReferenceType::Api,
            reference_id: reference_id.into(),
            roles: BTreeMap::from([(scope, role.to_string())]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_find_by_id() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();

        let found = repo
            .find_by_id("alice", MembershipReferenceType::Api, "api-1")
            .unwrap()
            .unwrap();
        assert_eq!(found.roles.get(&1).map(String::as_str), Some("OWNER"));
    }

    #[test]
    fn update_missing_membership_fails_precondition() {
        let repo = repository();
        let result = repo.update(&membership("alice", "api-1", 1, "OWNER"));
        assert!(matches!(result, Err(RepoError::PreconditionFailed { .. })));
    }

    #[test]
    fn find_by_user_spans_references() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();
        repo.create(&membership("alice", "api-2", 1, "USER")).unwrap();
        repo.create(&membership("bob", "api-1", 1, "USER")).unwrap();

        assert_eq!(repo.find_by_user("alice").unwrap().len(), 2);
        assert_eq!(repo.find_by_user("bob").unwrap().len(), 1);
        assert!(repo.find_by_user("carol").unwrap().is_empty());
    }

    #[test]
    fn find_by_references_and_role_filters_on_token() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();
        repo.create(&membership("bob", "api-1", 1, "USER")).unwrap();
        repo.create(&membership("carol", "api-2", 1, "OWNER")).unwrap();

        let owner = RoleToken::new(1, "OWNER").unwrap();
        let owners = repo
            .find_by_references_and_role(
                MembershipReferenceType::Api,
                &["api-1", "api-2"],
                Some(&owner),
            )
            .unwrap();
        let mut users: Vec<&str> = owners.iter().map(|m| m.user_id.as_str()).collect();
        users.sort_unstable();
        assert_eq!(users, vec!["alice", "carol"]);

        // No role filter returns the whole union
        let all = repo
            .find_by_references_and_role(MembershipReferenceType::Api, &["api-1", "api-2"], None)
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn find_by_user_and_reference_type_scopes_by_kind() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();
        let mut group = membership("alice", "g-1", 2, "ADMIN");
        group.reference_type = MembershipReferenceType::Group;
        repo.create(&group).unwrap();

        let apis = repo
            .find_by_user_and_reference_type("alice", MembershipReferenceType::Api)
            .unwrap();
        assert_eq!(apis.len(), 1);
        assert_eq!(apis[0].reference_id, "api-1");
    }

    #[test]
    fn find_by_role_scans_everything() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();
        let mut portal = membership("bob", "DEFAULT", 1, "OWNER");
        portal.reference_type = MembershipReferenceType::Portal;
        repo.create(&portal).unwrap();
        repo.create(&membership("carol", "api-2", 1, "USER")).unwrap();

        let owner = RoleToken::new(1, "OWNER").unwrap();
        assert_eq!(repo.find_by_role(&owner).unwrap().len(), 2);
    }

    #[test]
    fn save_member_overwrites_prior_role() {
        let repo = repository();
        let owner = RoleToken::new(1, "OWNER").unwrap();
        let user = RoleToken::new(1, "USER").unwrap();

        let first = repo
            .save_member(MembershipReferenceType::Api, "api-1", "alice", &owner)
            .unwrap();
        let second = repo
            .save_member(MembershipReferenceType::Api, "api-1", "alice", &user)
            .unwrap();

        // Exactly one record per (reference, user); the second role wins
        let all = repo.find_by_user("alice").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].roles, BTreeMap::from([(1, "USER".to_string())]));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn delete_is_idempotent_and_cleans_indexes() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();

        repo.delete("alice", MembershipReferenceType::Api, "api-1")
            .unwrap();
        assert!(repo.find_by_user("alice").unwrap().is_empty());
        assert!(repo
            .find_by_reference_and_role(MembershipReferenceType::Api, "api-1", None)
            .unwrap()
            .is_empty());

        // Deleting again is not an error
        repo.delete("alice", MembershipReferenceType::Api, "api-1")
            .unwrap();
    }

    #[test]
    fn delete_members_clears_one_reference() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();
        repo.create(&membership("bob", "api-1", 1, "USER")).unwrap();
        repo.create(&membership("alice", "api-2", 1, "OWNER")).unwrap();

        repo.delete_members(MembershipReferenceType::Api, "api-1")
            .unwrap();

        assert!(repo
            .find_by_reference_and_role(MembershipReferenceType::Api, "api-1", None)
            .unwrap()
            .is_empty());
        assert_eq!(repo.find_by_user("alice").unwrap().len(), 1);
    }

    #[test]
    fn find_by_ids_keeps_only_existing() {
        let repo = repository();
        repo.create(&membership("alice", "api-1", 1, "OWNER")).unwrap();

        let found = repo
            .find_by_ids(
                "alice",
                MembershipReferenceType::Api,
                &["api-1".to_string(), "api-404".to_string()],
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference_id, "api-1");
    }
}
