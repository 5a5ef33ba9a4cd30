//! Group entity: domain model, storage record, conversions.

use super::{roles_to_tokens, symbol_enum, tokens_to_roles};
use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::{millis, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Platform events a group can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupEvent {
    /// A new API was created.
    ApiCreate,
    /// A new application was created.
    ApplicationCreate,
}

symbol_enum!(GroupEvent, "GroupEvent", {
    ApiCreate => "API_CREATE",
    ApplicationCreate => "APPLICATION_CREATE",
});

/// Automatic-membership rule: the group is attached when `event` fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEventRule {
    /// The triggering event.
    pub event: GroupEvent,
}

/// A user group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Automatic-membership rules. Absent and empty are distinct.
    pub event_rules: Option<Vec<GroupEventRule>>,
    /// Default roles granted through the group (scope -> name).
    pub roles: Option<BTreeMap<i32, String>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Storage record for [`Group`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) event_rules: Option<Vec<String>>,
    /// Compound role tokens, one per granted scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) roles: Option<Vec<String>>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl Record for GroupRecord {
    const HASH_KEY: &'static str = "group";

    fn id(&self) -> &str {
        &self.id
    }
}

impl TryFrom<&Group> for GroupRecord {
    type Error = RepoError;

    fn try_from(group: &Group) -> Result<Self, Self::Error> {
        Ok(Self {
            id: group.id.clone(),
            name: group.name.clone(),
            event_rules: group
                .event_rules
                .as_ref()
                .map(|rules| rules.iter().map(|r| r.event.as_name().to_string()).collect()),
            roles: group
                .roles
                .as_ref()
                .map(|roles| roles_to_tokens(roles))
                .transpose()?,
            created_at: millis::to_millis(group.created_at),
            updated_at: millis::to_millis(group.updated_at),
        })
    }
}

impl TryFrom<GroupRecord> for Group {
    type Error = RepoError;

    fn try_from(record: GroupRecord) -> Result<Self, Self::Error> {
        let event_rules = record
            .event_rules
            .map(|events| {
                events
                    .iter()
                    .map(|e| Ok(GroupEventRule {
                        event: GroupEvent::from_name(e)?,
                    }))
                    .collect::<Result<Vec<_>, gatehouse_codec::CodecError>>()
            })
            .transpose()?;
        let roles = record
            .roles
            .as_deref()
            .map(tokens_to_roles)
            .transpose()?;
        Ok(Self {
            event_rules,
            roles,
            created_at: millis::from_millis(record.created_at),
            updated_at: millis::from_millis(record.updated_at),
            id: record.id,
            name: record.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> Group {
        let mut roles = BTreeMap::new();
        roles.insert(2, "USER".to_string());
        Group {
            id: "g-1".into(),
            name: "Consumers".into(),
            event_rules: Some(vec![GroupEventRule {
                event: GroupEvent::ApiCreate,
            }]),
            roles: Some(roles),
            created_at: millis::from_millis(1_600_000_000_000),
            updated_at: millis::from_millis(1_600_000_000_000),
        }
    }

    #[test]
    fn record_round_trip() {
        let group = sample_group();
        let record = GroupRecord::try_from(&group).unwrap();
        assert_eq!(record.roles, Some(vec!["2:USER".to_string()]));
        assert_eq!(Group::try_from(record).unwrap(), group);
    }

    #[test]
    fn absent_collections_stay_absent() {
        let group = Group {
            event_rules: None,
            roles: None,
            ..sample_group()
        };
        let back = Group::try_from(GroupRecord::try_from(&group).unwrap()).unwrap();
        assert_eq!(back.event_rules, None);
        assert_eq!(back.roles, None);
    }

    #[test]
    fn unknown_event_fails() {
        let mut record = GroupRecord::try_from(&sample_group()).unwrap();
        record.event_rules = Some(vec!["PLAN_CREATE".into()]);
        assert!(Group::try_from(record).is_err());
    }
}
