//! Entity repositories: CRUD, secondary-index maintenance, and the fixed
//! set of relationship/criteria queries.
//!
//! Each repository owns one entity type's primary hash plus the derived
//! index sets for its query dimensions. Repositories are wired by explicit
//! constructor injection: each takes the shared backend (and, where a
//! query spans entities, another repository) in `new`.

mod api;
mod api_key;
mod group;
mod membership;
mod page;
mod quality_rule;
mod token;
mod workflow;

pub use api::ApiRepository;
pub use api_key::ApiKeyRepository;
pub use group::GroupRepository;
pub use membership::MembershipRepository;
pub use page::PageRepository;
pub use quality_rule::QualityRuleRepository;
pub use token::TokenRepository;
pub use workflow::WorkflowRepository;

use crate::store::Record;
use tracing::warn;

/// Drops ids whose record is gone from the primary hash.
///
/// Index sets and the primary hash are written separately, so a reader
/// can observe an indexed id with no backing record. Those are skipped
/// with a warning rather than surfaced as errors.
pub(crate) fn present<R: Record>(ids: &[String], records: Vec<Option<R>>) -> Vec<R> {
    ids.iter()
        .zip(records)
        .filter_map(|(id, record)| {
            if record.is_none() {
                warn!(
                    hash = R::HASH_KEY,
                    id = %id,
                    "indexed entity missing from primary hash, skipping"
                );
            }
            record
        })
        .collect()
}
