//! Domain models and their storage records.
//!
//! Each entity type lives in one file holding the domain struct, its
//! storage record, and exactly one conversion pair between the two - the
//! single source of truth for the field mapping. Records store timestamps
//! as millisecond integers, enums as symbolic name strings, and role maps
//! as compound tokens.

mod api;
mod api_key;
mod group;
mod membership;
mod page;
mod quality_rule;
mod token;
mod workflow;

pub use api::{Api, ApiLifecycleState, ApiRecord, LifecycleState, Visibility};
pub use api_key::{ApiKey, ApiKeyRecord};
pub use group::{Group, GroupEvent, GroupEventRule, GroupRecord};
pub use membership::{Membership, MembershipRecord, MembershipReferenceType};
pub(crate) use membership::membership_id;
pub use page::{Page, PageCriteria, PageRecord, PageSource, PageType};
pub use quality_rule::{QualityRule, QualityRuleRecord};
pub use token::{Token, TokenRecord};
pub use workflow::{Workflow, WorkflowRecord};

/// Implements [`gatehouse_codec::Symbol`] for an enum stored by variant name.
macro_rules! symbol_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl gatehouse_codec::Symbol for $ty {
            fn as_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            fn from_name(name: &str) -> gatehouse_codec::CodecResult<Self> {
                match name {
                    $($name => Ok(Self::$variant),)+
                    other => Err(gatehouse_codec::CodecError::unknown_enum_value(
                        $kind, other,
                    )),
                }
            }
        }
    };
}

pub(crate) use symbol_enum;

use gatehouse_codec::{CodecResult, RoleToken, Symbol};
use std::collections::BTreeMap;

/// Encodes a role map (scope -> name) into its stored token list.
pub(crate) fn roles_to_tokens(roles: &BTreeMap<i32, String>) -> CodecResult<Vec<String>> {
    roles
        .iter()
        .map(|(scope, name)| Ok(RoleToken::new(*scope, name.clone())?.encode()))
        .collect()
}

/// Decodes a stored token list back into a role map.
///
/// At most one name per scope; a later token for the same scope wins.
pub(crate) fn tokens_to_roles(tokens: &[String]) -> CodecResult<BTreeMap<i32, String>> {
    let mut roles = BTreeMap::new();
    for token in tokens {
        let role = RoleToken::decode(token)?;
        roles.insert(role.scope(), role.name().to_string());
    }
    Ok(roles)
}

/// Encodes an optional enum field for storage.
pub(crate) fn opt_enum_to_name<S: Symbol>(value: Option<&S>) -> Option<String> {
    value.map(|v| v.as_name().to_string())
}

/// Decodes an optional stored enum field.
///
/// Absent fields pass through as `None` without conversion.
pub(crate) fn opt_enum_from_name<S: Symbol>(name: Option<&String>) -> CodecResult<Option<S>> {
    name.map(|n| S::from_name(n)).transpose()
}
