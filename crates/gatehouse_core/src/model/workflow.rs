//! Workflow entity: domain model, storage record, conversions.

use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::millis;
use serde::{Deserialize, Serialize};

/// A review/approval workflow step attached to a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    /// Unique id.
    pub id: String,
    /// Kind of the owning reference.
    pub reference_type: String,
    /// Id of the owning reference.
    pub reference_id: String,
    /// Workflow kind (e.g. `"REVIEW"`).
    pub workflow_type: String,
    /// Current state.
    pub state: String,
    /// Reviewer comment.
    pub comment: Option<String>,
    /// Acting user.
    pub user: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Storage record for [`Workflow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub(crate) id: String,
    pub(crate) reference_type: String,
    pub(crate) reference_id: String,
    #[serde(rename = "type")]
    pub(crate) workflow_type: String,
    pub(crate) state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
    pub(crate) user: String,
    pub(crate) created_at: i64,
}

impl Record for WorkflowRecord {
    const HASH_KEY: &'static str = "workflow";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&Workflow> for WorkflowRecord {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id.clone(),
            reference_type: workflow.reference_type.clone(),
            reference_id: workflow.reference_id.clone(),
            workflow_type: workflow.workflow_type.clone(),
            state: workflow.state.clone(),
            comment: workflow.comment.clone(),
            user: workflow.user.clone(),
            created_at: millis::to_millis(workflow.created_at),
        }
    }
}

impl TryFrom<WorkflowRecord> for Workflow {
    type Error = RepoError;

    fn try_from(record: WorkflowRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: millis::from_millis(record.created_at),
            id: record.id,
            reference_type: record.reference_type,
            reference_id: record.reference_id,
            workflow_type: record.workflow_type,
            state: record.state,
            comment: record.comment,
            user: record.user,
        })
    }
}
