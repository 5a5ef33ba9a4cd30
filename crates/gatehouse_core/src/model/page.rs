//! Page entity: domain model, storage record, search criteria.

use super::symbol_enum;
use crate::error::RepoError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use gatehouse_codec::{millis, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Markdown content.
    Markdown,
    /// An OpenAPI/Swagger descriptor.
    Swagger,
    /// A folder grouping child pages.
    Folder,
}

symbol_enum!(PageType, "PageType", {
    Markdown => "MARKDOWN",
    Swagger => "SWAGGER",
    Folder => "FOLDER",
});

/// Where a page's content is fetched from, if external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSource {
    /// Fetcher type.
    pub source_type: String,
    /// Fetcher configuration payload.
    pub configuration: Option<String>,
}

/// A documentation page.
///
/// Pages form a forest through `parent_id` and are scoped either to a
/// single API (`api` set) or to the portal (global) when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Page kind.
    pub page_type: PageType,
    /// Owning API; `None` for portal pages.
    pub api: Option<String>,
    /// Page content.
    pub content: Option<String>,
    /// Username of the last editor.
    pub last_contributor: Option<String>,
    /// Ordering within its scope.
    pub order: i32,
    /// Whether the page is visible in the portal.
    pub published: bool,
    /// Whether the page is its scope's homepage.
    pub homepage: bool,
    /// Parent page; `None` for root pages.
    pub parent_id: Option<String>,
    /// Group ids excluded from seeing the page.
    pub excluded_groups: Option<Vec<String>>,
    /// External content source.
    pub source: Option<PageSource>,
    /// Renderer configuration.
    pub configuration: Option<BTreeMap<String, String>>,
    /// Free-form metadata.
    pub metadata: Option<BTreeMap<String, String>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Storage record for [`Page`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) page_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) api: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) last_contributor: Option<String>,
    #[serde(default)]
    pub(crate) order: i32,
    #[serde(default)]
    pub(crate) published: bool,
    #[serde(default)]
    pub(crate) homepage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) excluded_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) source: Option<PageSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) configuration: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) metadata: Option<BTreeMap<String, String>>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl PageRecord {
    /// True when this page has no parent (root of its scope's forest).
    pub(crate) fn is_root(&self) -> bool {
        self.parent_id.as_deref().is_none_or(str::is_empty)
    }
}

impl Record for PageRecord {
    const HASH_KEY: &'static str = "page";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&Page> for PageRecord {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            name: page.name.clone(),
            page_type: page.page_type.as_name().to_string(),
            api: page.api.clone(),
            content: page.content.clone(),
            last_contributor: page.last_contributor.clone(),
            order: page.order,
            published: page.published,
            homepage: page.homepage,
            parent_id: page.parent_id.clone(),
            excluded_groups: page.excluded_groups.clone(),
            source: page.source.clone(),
            configuration: page.configuration.clone(),
            metadata: page.metadata.clone(),
            created_at: millis::to_millis(page.created_at),
            updated_at: millis::to_millis(page.updated_at),
        }
    }
}

impl TryFrom<PageRecord> for Page {
    type Error = RepoError;

    fn try_from(record: PageRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            page_type: PageType::from_name(&record.page_type)?,
            created_at: millis::from_millis(record.created_at),
            updated_at: millis::from_millis(record.updated_at),
            id: record.id,
            name: record.name,
            api: record.api,
            content: record.content,
            last_contributor: record.last_contributor,
            order: record.order,
            published: record.published,
            homepage: record.homepage,
            parent_id: record.parent_id,
            excluded_groups: record.excluded_groups,
            source: record.source,
            configuration: record.configuration,
            metadata: record.metadata,
        })
    }
}

/// Conjunctive search criteria for pages.
///
/// The candidate set is chosen by ownership scope first: `api` selects an
/// API's pages, otherwise portal pages. Every other present field then
/// filters the candidates (logical AND); an absent field skips its filter.
#[derive(Debug, Clone, Default)]
pub struct PageCriteria {
    /// Scope to an API's pages; portal pages when unset or empty.
    pub api: Option<String>,
    /// Keep only (non-)homepages.
    pub homepage: Option<bool>,
    /// Keep only (un)published pages.
    pub published: Option<bool>,
    /// Exact name match.
    pub name: Option<String>,
    /// Exact parent id match.
    pub parent: Option<String>,
    /// When `true`, keep only root pages (no parent).
    pub root_parent: Option<bool>,
    /// Page kind match.
    pub page_type: Option<PageType>,
}
