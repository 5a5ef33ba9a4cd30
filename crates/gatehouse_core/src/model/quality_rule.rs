//! Quality rule entity: domain model, storage record, conversions.

use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::millis;
use serde::{Deserialize, Serialize};

/// A manual quality criterion APIs are reviewed against.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityRule {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What the rule checks.
    pub description: Option<String>,
    /// Weight in the overall quality score.
    pub weight: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Storage record for [`QualityRule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRuleRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) weight: i32,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl Record for QualityRuleRecord {
    const HASH_KEY: &'static str = "qualityrule";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&QualityRule> for QualityRuleRecord {
    fn from(rule: &QualityRule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            weight: rule.weight,
            created_at: millis::to_millis(rule.created_at),
            updated_at: millis::to_millis(rule.updated_at),
        }
    }
}

impl TryFrom<QualityRuleRecord> for QualityRule {
    type Error = RepoError;

    fn try_from(record: QualityRuleRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: millis::from_millis(record.created_at),
            updated_at: millis::from_millis(record.updated_at),
            id: record.id,
            name: record.name,
            description: record.description,
            weight: record.weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trip() {
        let rule = QualityRule {
            id: "qr-1".into(),
            name: "Has description".into(),
            description: Some("The API carries a description".into()),
            weight: 10,
            created_at: millis::from_millis(1_600_000_000_000),
            updated_at: millis::from_millis(1_600_000_000_000),
        };
        let back = QualityRule::try_from(QualityRuleRecord::from(&rule)).unwrap();
        assert_eq!(back, rule);
    }
}
