//! Membership entity: the ternary user/reference relation.

use super::{roles_to_tokens, symbol_enum, tokens_to_roles};
use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::{millis, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of entity a membership is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipReferenceType {
    /// An API.
    Api,
    /// An application.
    Application,
    /// A group.
    Group,
    /// The portal itself.
    Portal,
    /// The management console.
    Management,
}

symbol_enum!(MembershipReferenceType, "MembershipReferenceType", {
    Api => "API",
    Application => "APPLICATION",
    Group => "GROUP",
    Portal => "PORTAL",
    Management => "MANAGEMENT",
});

/// A user's membership of one reference entity.
///
/// At most one membership record exists per
/// `(user_id, reference_type, reference_id)` triple; the roles map holds
/// at most one role name per scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    /// The member.
    pub user_id: String,
    /// Kind of the owning entity.
    pub reference_type: MembershipReferenceType,
    /// Id of the owning entity.
    pub reference_id: String,
    /// Granted roles, scope -> name.
    pub roles: BTreeMap<i32, String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// The primary-hash field id of this membership,
    /// `"{user}:{referenceType}:{referenceId}"`.
    #[must_use]
    pub fn id(&self) -> String {
        membership_id(
            &self.user_id,
            self.reference_type,
            &self.reference_id,
        )
    }
}

/// Composes the primary-hash field id for a membership triple.
#[must_use]
pub(crate) fn membership_id(
    user_id: &str,
    reference_type: MembershipReferenceType,
    reference_id: &str,
) -> String {
    format!("{user_id}:{}:{reference_id}", reference_type.as_name())
}

/// Storage record for [`Membership`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) reference_type: String,
    pub(crate) reference_id: String,
    /// Compound role tokens, one per granted scope.
    #[serde(default)]
    pub(crate) roles: Vec<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl MembershipRecord {
    /// True if the record carries the given encoded role token.
    pub(crate) fn has_role_token(&self, token: &str) -> bool {
        self.roles.iter().any(|r| r == token)
    }
}

impl Record for MembershipRecord {
    const HASH_KEY: &'static str = "membership";

    fn id(&self) -> &str {
        &self.id
    }
}

impl TryFrom<&Membership> for MembershipRecord {
    type Error = RepoError;

    fn try_from(membership: &Membership) -> Result<Self, Self::Error> {
        Ok(Self {
            id: membership.id(),
            user_id: membership.user_id.clone(),
            reference_type: membership.reference_type.as_name().to_string(),
            reference_id: membership.reference_id.clone(),
            roles: roles_to_tokens(&membership.roles)?,
            created_at: millis::to_millis(membership.created_at),
            updated_at: millis::to_millis(membership.updated_at),
        })
    }
}

impl TryFrom<MembershipRecord> for Membership {
    type Error = RepoError;

    fn try_from(record: MembershipRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            reference_type: MembershipReferenceType::from_name(&record.reference_type)?,
            roles: tokens_to_roles(&record.roles)?,
            created_at: millis::from_millis(record.created_at),
            updated_at: millis::from_millis(record.updated_at),
            user_id: record.user_id,
            reference_id: record.reference_id,
        })
    }
}
