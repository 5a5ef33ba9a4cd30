//! Workflow repository: CRUD plus the owning-reference index.

use super::present;
use crate::error::{RepoError, RepoResult};
use crate::index::IndexSet;
use crate::model::{Workflow, WorkflowRecord};
use crate::store::EntityStore;
use gatehouse_kv::KvBackend;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`Workflow`] records.
///
/// One derived set per owning reference
/// (`workflow:reference:{type}:{id}`) holds the reference's workflow ids.
/// Queries return newest first.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    store: EntityStore<WorkflowRecord>,
    by_reference: IndexSet,
}

fn reference_key(reference_type: &str, reference_id: &str) -> String {
    format!("{reference_type}:{reference_id}")
}

impl WorkflowRepository {
    /// Creates a workflow repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(Arc::clone(&backend)),
            by_reference: IndexSet::new(backend, "workflow:reference"),
        }
    }

    /// Persists a new workflow step.
    pub fn create(&self, workflow: &Workflow) -> RepoResult<Workflow> {
        self.persist(workflow)?;
        Ok(workflow.clone())
    }

    /// Updates an existing workflow step.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no workflow with this
    /// id exists.
    pub fn update(&self, workflow: &Workflow) -> RepoResult<Workflow> {
        if workflow.id.is_empty() || !self.store.exists(&workflow.id)? {
            return Err(RepoError::precondition_failed(format!(
                "no workflow found with id [{}]",
                workflow.id
            )));
        }
        self.persist(workflow)?;
        Ok(workflow.clone())
    }

    /// Point lookup by id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Workflow>> {
        self.store.get(id)?.map(Workflow::try_from).transpose()
    }

    /// Every stored workflow, newest first. Full scan.
    pub fn find_all(&self) -> RepoResult<Vec<Workflow>> {
        into_sorted_domain(self.store.all()?)
    }

    /// Workflows of one reference, newest first.
    pub fn find_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> RepoResult<Vec<Workflow>> {
        let records = self.records_by_reference(reference_type, reference_id)?;
        into_sorted_domain(records)
    }

    /// Workflows of one reference and kind, newest first.
    pub fn find_by_reference_and_type(
        &self,
        reference_type: &str,
        reference_id: &str,
        workflow_type: &str,
    ) -> RepoResult<Vec<Workflow>> {
        let records = self
            .records_by_reference(reference_type, reference_id)?
            .into_iter()
            .filter(|r| r.workflow_type == workflow_type)
            .collect();
        into_sorted_domain(records)
    }

    /// Deletes a workflow by id. Idempotent.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        if let Some(record) = self.store.get(id)? {
            self.by_reference.remove(
                &reference_key(&record.reference_type, &record.reference_id),
                id,
            )?;
        }
        self.store.delete(id)?;
        debug!(workflow = %id, "deleted workflow");
        Ok(())
    }

    fn persist(&self, workflow: &Workflow) -> RepoResult<()> {
        let record = WorkflowRecord::from(workflow);
        self.store.put(&record)?;
        self.by_reference.add(
            &reference_key(&workflow.reference_type, &workflow.reference_id),
            &workflow.id,
        )?;
        debug!(workflow = %workflow.id, "saved workflow");
        Ok(())
    }

    fn records_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> RepoResult<Vec<WorkflowRecord>> {
        let mut ids = self
            .by_reference
            .members(&reference_key(reference_type, reference_id))?;
        ids.sort_unstable();
        Ok(present(&ids, self.store.multi_get(&ids)?))
    }
}

fn into_sorted_domain(records: Vec<WorkflowRecord>) -> RepoResult<Vec<Workflow>> {
    let mut workflows: Vec<Workflow> = records
        .into_iter()
        .map(Workflow::try_from)
        .collect::<RepoResult<_>>()?;
    workflows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(workflows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_codec::millis;
    use gatehouse_kv::InMemoryBackend;

    fn repository() -> WorkflowRepository {
        WorkflowRepository::new(Arc::new(InMemoryBackend::new()))
    }

    fn workflow(id: &str, reference_id: &str, created_ms: i64) -> Workflow {
        Workflow {
            id: id.into(),
            reference_type: "API".into(),
            reference_id: reference_id.into(),
            workflow_type: "REVIEW".into(),
            state: "IN_REVIEW".into(),
            comment: None,
            user: "alice".into(),
            created_at: millis::from_millis(created_ms),
        }
    }

    #[test]
    fn find_by_reference_returns_newest_first() {
        let repo = repository();
        repo.create(&workflow("w-1", "api-1", 1_000)).unwrap();
        repo.create(&workflow("w-2", "api-1", 3_000)).unwrap();
        repo.create(&workflow("w-3", "api-1", 2_000)).unwrap();
        repo.create(&workflow("w-4", "api-2", 4_000)).unwrap();

        let found = repo.find_by_reference("API", "api-1").unwrap();
        let ids: Vec<&str> = found.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["w-2", "w-3", "w-1"]);

        let all: Vec<String> = repo
            .find_all()
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(all, vec!["w-4", "w-2", "w-3", "w-1"]);
    }

    #[test]
    fn find_by_reference_and_type_filters_kind() {
        let repo = repository();
        repo.create(&workflow("w-1", "api-1", 1_000)).unwrap();
        let mut other = workflow("w-2", "api-1", 2_000);
        other.workflow_type = "QUALITY".into();
        repo.create(&other).unwrap();

        let reviews = repo
            .find_by_reference_and_type("API", "api-1", "REVIEW")
            .unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, "w-1");
    }

    #[test]
    fn update_missing_workflow_fails_precondition() {
        let repo = repository();
        let result = repo.update(&workflow("w-1", "api-1", 1_000));
        assert!(matches!(result, Err(RepoError::PreconditionFailed { .. })));
    }

    #[test]
    fn update_changes_state() {
        let repo = repository();
        let created = repo.create(&workflow("w-1", "api-1", 1_000)).unwrap();

        let accepted = Workflow {
            state: "REVIEW_OK".into(),
            comment: Some("lgtm".into()),
            ..created
        };
        repo.update(&accepted).unwrap();

        let found = repo.find_by_id("w-1").unwrap().unwrap();
        assert_eq!(found.state, "REVIEW_OK");
    }

    #[test]
    fn delete_cleans_reference_bucket() {
        let repo = repository();
        repo.create(&workflow("w-1", "api-1", 1_000)).unwrap();

        repo.delete("w-1").unwrap();
        assert!(repo.find_by_id("w-1").unwrap().is_none());
        assert!(repo.find_by_reference("API", "api-1").unwrap().is_empty());

        repo.delete("w-1").unwrap();
    }

    #[test]
    fn created_at_round_trips_through_storage() {
        let repo = repository();
        let now = Utc::now();
        let mut step = workflow("w-1", "api-1", 0);
        step.created_at = millis::from_millis(millis::to_millis(now));
        repo.create(&step).unwrap();

        let found = repo.find_by_id("w-1").unwrap().unwrap();
        assert_eq!(millis::to_millis(found.created_at), millis::to_millis(now));
    }
}
