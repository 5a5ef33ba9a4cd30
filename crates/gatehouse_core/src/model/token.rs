//! Personal access token entity: domain model, storage record, conversions.

use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::millis;
use serde::{Deserialize, Serialize};

/// A personal access token attached to a reference (typically a user).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Unique id.
    pub id: String,
    /// The hashed token credential.
    pub token: String,
    /// Kind of the owning reference.
    pub reference_type: String,
    /// Id of the owning reference.
    pub reference_id: String,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiration time, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Last time the token was used, if ever.
    pub last_use_at: Option<DateTime<Utc>>,
}

/// Storage record for [`Token`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub(crate) id: String,
    pub(crate) token: String,
    pub(crate) reference_type: String,
    pub(crate) reference_id: String,
    pub(crate) name: String,
    pub(crate) created_at: i64,
    #[serde(default)]
    pub(crate) expires_at: i64,
    #[serde(default)]
    pub(crate) last_use_at: i64,
}

impl Record for TokenRecord {
    const HASH_KEY: &'static str = "token";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&Token> for TokenRecord {
    fn from(token: &Token) -> Self {
        Self {
            id: token.id.clone(),
            token: token.token.clone(),
            reference_type: token.reference_type.clone(),
            reference_id: token.reference_id.clone(),
            name: token.name.clone(),
            created_at: millis::to_millis(token.created_at),
            expires_at: millis::opt_to_millis(token.expires_at),
            last_use_at: millis::opt_to_millis(token.last_use_at),
        }
    }
}

impl TryFrom<TokenRecord> for Token {
    type Error = RepoError;

    fn try_from(record: TokenRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: millis::from_millis(record.created_at),
            expires_at: millis::opt_from_millis(record.expires_at),
            last_use_at: millis::opt_from_millis(record.last_use_at),
            id: record.id,
            token: record.token,
            reference_type: record.reference_type,
            reference_id: record.reference_id,
            name: record.name,
        })
    }
}
