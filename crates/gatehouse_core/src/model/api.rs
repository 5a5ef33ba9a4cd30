//! API entity: domain model, storage record, conversions.

use super::{opt_enum_from_name, opt_enum_to_name, symbol_enum};
use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::{millis, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Who may see an API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible to everyone.
    Public,
    /// Visible to members only.
    Private,
}

symbol_enum!(Visibility, "Visibility", {
    Public => "PUBLIC",
    Private => "PRIVATE",
});

/// Runtime lifecycle of an API deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// The API is deployed and serving.
    Started,
    /// The API is stopped.
    Stopped,
}

symbol_enum!(LifecycleState, "LifecycleState", {
    Started => "STARTED",
    Stopped => "STOPPED",
});

/// Publication lifecycle of an API in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiLifecycleState {
    /// Newly created, not yet published.
    Created,
    /// Published in the portal.
    Published,
    /// Withdrawn from the portal.
    Unpublished,
    /// Deprecated but still reachable.
    Deprecated,
    /// Archived.
    Archived,
}

symbol_enum!(ApiLifecycleState, "ApiLifecycleState", {
    Created => "CREATED",
    Published => "PUBLISHED",
    Unpublished => "UNPUBLISHED",
    Deprecated => "DEPRECATED",
    Archived => "ARCHIVED",
});

/// A managed API.
#[derive(Debug, Clone, PartialEq)]
pub struct Api {
    /// Unique id, immutable after creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Version string.
    pub version: String,
    /// Description shown in the portal.
    pub description: String,
    /// Gateway definition payload.
    pub definition: Option<String>,
    /// Portal visibility.
    pub visibility: Visibility,
    /// Runtime state, if the API was ever deployed.
    pub lifecycle_state: Option<LifecycleState>,
    /// Publication state.
    pub api_lifecycle_state: Option<ApiLifecycleState>,
    /// Portal picture, as a data URL.
    pub picture: Option<String>,
    /// Group ids granted access. Absent and empty are distinct.
    pub groups: Option<BTreeSet<String>>,
    /// View ids the API is listed under.
    pub views: Option<BTreeSet<String>>,
    /// Free-form labels.
    pub labels: Option<Vec<String>>,
    /// Last deployment time; unset if never deployed.
    pub deployed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time; never decreases.
    pub updated_at: DateTime<Utc>,
}

/// Storage record for [`Api`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) definition: Option<String>,
    pub(crate) visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) api_lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) groups: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) views: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) labels: Option<Vec<String>>,
    /// Milliseconds since epoch; `0` means never deployed.
    #[serde(default)]
    pub(crate) deployed_at: i64,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl Record for ApiRecord {
    const HASH_KEY: &'static str = "api";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&Api> for ApiRecord {
    fn from(api: &Api) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            version: api.version.clone(),
            description: api.description.clone(),
            definition: api.definition.clone(),
            visibility: api.visibility.as_name().to_string(),
            lifecycle_state: opt_enum_to_name(api.lifecycle_state.as_ref()),
            api_lifecycle_state: opt_enum_to_name(api.api_lifecycle_state.as_ref()),
            picture: api.picture.clone(),
            groups: api.groups.clone(),
            views: api.views.clone(),
            labels: api.labels.clone(),
            deployed_at: millis::opt_to_millis(api.deployed_at),
            created_at: millis::to_millis(api.created_at),
            updated_at: millis::to_millis(api.updated_at),
        }
    }
}

impl TryFrom<ApiRecord> for Api {
    type Error = RepoError;

    fn try_from(record: ApiRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            visibility: Visibility::from_name(&record.visibility)?,
            lifecycle_state: opt_enum_from_name(record.lifecycle_state.as_ref())?,
            api_lifecycle_state: opt_enum_from_name(record.api_lifecycle_state.as_ref())?,
            deployed_at: millis::opt_from_millis(record.deployed_at),
            created_at: millis::from_millis(record.created_at),
            updated_at: millis::from_millis(record.updated_at),
            id: record.id,
            name: record.name,
            version: record.version,
            description: record.description,
            definition: record.definition,
            picture: record.picture,
            groups: record.groups,
            views: record.views,
            labels: record.labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_api() -> Api {
        Api {
            id: "api-1".into(),
            name: "Orders".into(),
            version: "1.0".into(),
            description: "Order management".into(),
            definition: Some("{}".into()),
            visibility: Visibility::Public,
            lifecycle_state: Some(LifecycleState::Started),
            api_lifecycle_state: Some(ApiLifecycleState::Published),
            picture: None,
            groups: Some(["g1".to_string()].into()),
            views: None,
            labels: Some(vec!["prod".into()]),
            deployed_at: Some(millis::from_millis(1_700_000_000_000)),
            created_at: millis::from_millis(1_600_000_000_000),
            updated_at: millis::from_millis(1_700_000_000_000),
        }
    }

    #[test]
    fn record_round_trip() {
        let api = sample_api();
        let record = ApiRecord::from(&api);
        let back = Api::try_from(record).unwrap();
        assert_eq!(back, api);
    }

    #[test]
    fn round_trip_with_optionals_unset() {
        let api = Api {
            definition: None,
            lifecycle_state: None,
            api_lifecycle_state: None,
            groups: None,
            labels: None,
            deployed_at: None,
            ..sample_api()
        };
        let record = ApiRecord::from(&api);
        assert_eq!(record.deployed_at, 0);
        let back = Api::try_from(record).unwrap();
        assert_eq!(back, api);
    }

    #[test]
    fn empty_collections_survive_round_trip() {
        let api = Api {
            groups: Some(BTreeSet::new()),
            labels: Some(Vec::new()),
            ..sample_api()
        };
        let back = Api::try_from(ApiRecord::from(&api)).unwrap();
        assert_eq!(back.groups, Some(BTreeSet::new()));
        assert_eq!(back.labels, Some(Vec::new()));
    }

    #[test]
    fn unknown_visibility_fails() {
        let mut record = ApiRecord::from(&sample_api());
        record.visibility = "HIDDEN".into();
        assert!(Api::try_from(record).is_err());
    }

    #[test]
    fn unknown_optional_enum_fails() {
        let mut record = ApiRecord::from(&sample_api());
        record.lifecycle_state = Some("PAUSED".into());
        assert!(Api::try_from(record).is_err());
    }
}
