//! API key entity: domain model, storage record, conversions.

use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::millis;
use serde::{Deserialize, Serialize};

/// A key granting an application access to an API under a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    /// The key value itself; primary id.
    pub key: String,
    /// The API the key grants access to.
    pub api: String,
    /// The consuming application.
    pub application: String,
    /// The plan the key was issued under.
    pub plan: String,
    /// The subscription the key belongs to.
    pub subscription: String,
    /// Whether the key has been revoked.
    pub revoked: bool,
    /// Whether the key is temporarily paused.
    pub paused: bool,
    /// Expiration time, if any.
    pub expire_at: Option<DateTime<Utc>>,
    /// Revocation time, if revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Storage record for [`ApiKey`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub(crate) key: String,
    pub(crate) api: String,
    pub(crate) application: String,
    pub(crate) plan: String,
    pub(crate) subscription: String,
    #[serde(default)]
    pub(crate) revoked: bool,
    #[serde(default)]
    pub(crate) paused: bool,
    #[serde(default)]
    pub(crate) expire_at: i64,
    #[serde(default)]
    pub(crate) revoked_at: i64,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl Record for ApiKeyRecord {
    const HASH_KEY: &'static str = "apikey";

    fn id(&self) -> &str {
        &self.key
    }
}

impl From<&ApiKey> for ApiKeyRecord {
    fn from(api_key: &ApiKey) -> Self {
        Self {
            key: api_key.key.clone(),
            api: api_key.api.clone(),
            application: api_key.application.clone(),
            plan: api_key.plan.clone(),
            subscription: api_key.subscription.clone(),
            revoked: api_key.revoked,
            paused: api_key.paused,
            expire_at: millis::opt_to_millis(api_key.expire_at),
            revoked_at: millis::opt_to_millis(api_key.revoked_at),
            created_at: millis::to_millis(api_key.created_at),
            updated_at: millis::to_millis(api_key.updated_at),
        }
    }
}

impl TryFrom<ApiKeyRecord> for ApiKey {
    type Error = RepoError;

    fn try_from(record: ApiKeyRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            expire_at: millis::opt_from_millis(record.expire_at),
            revoked_at: millis::opt_from_millis(record.revoked_at),
            created_at: millis::from_millis(record.created_at),
            updated_at: millis::from_millis(record.updated_at),
            key: record.key,
            api: record.api,
            application: record.application,
            plan: record.plan,
            subscription: record.subscription,
            revoked: record.revoked,
            paused: record.paused,
        })
    }
}
