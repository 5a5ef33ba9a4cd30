//! Page repository: CRUD, scope buckets, criteria search, order helpers.

use super::present;
use crate::error::{RepoError, RepoResult};
use crate::index::IndexSet;
use crate::model::{Page, PageCriteria, PageRecord};
use crate::store::EntityStore;
use gatehouse_codec::Symbol;
use gatehouse_kv::KvBackend;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`Page`] records.
///
/// Every page belongs to exactly one ownership scope: an API or the
/// portal. One derived set per scope holds the scope's page ids
/// (`page:api:{api}`, `page:portal`); criteria search and the max-order
/// helpers read only the relevant bucket.
#[derive(Debug, Clone)]
pub struct PageRepository {
    store: EntityStore<PageRecord>,
    by_scope: IndexSet,
}

/// Bucket key for a page's ownership scope.
fn scope_key(api: Option<&str>) -> String {
    match api {
        Some(api) if !api.is_empty() => format!("api:{api}"),
        _ => "portal".to_string(),
    }
}

impl PageRepository {
    /// Creates a page repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(Arc::clone(&backend)),
            by_scope: IndexSet::new(backend, "page"),
        }
    }

    /// Persists a new page.
    pub fn create(&self, page: &Page) -> RepoResult<Page> {
        self.persist(page)?;
        Ok(page.clone())
    }

    /// Updates an existing page.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no page with this id
    /// exists.
    pub fn update(&self, page: &Page) -> RepoResult<Page> {
        if page.id.is_empty() || !self.store.exists(&page.id)? {
            return Err(RepoError::precondition_failed(format!(
                "no page found with id [{}]",
                page.id
            )));
        }
        self.persist(page)?;
        Ok(page.clone())
    }

    /// Point lookup by id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Page>> {
        self.store.get(id)?.map(Page::try_from).transpose()
    }

    /// Pages matching the criteria, all present fields ANDed together.
    ///
    /// The candidate set is the scope bucket named by `criteria.api`
    /// (the portal bucket when unset); every other field then filters
    /// the candidates against their stored state.
    pub fn search(&self, criteria: &PageCriteria) -> RepoResult<Vec<Page>> {
        let records = self.records_in_scope(criteria.api.as_deref())?;
        let mut pages: Vec<Page> = records
            .into_iter()
            .filter(|r| matches(r, criteria))
            .map(Page::try_from)
            .collect::<RepoResult<_>>()?;
        pages.sort_by_key(|p| p.order);
        Ok(pages)
    }

    /// Highest `order` among an API's pages, `0` when the API has none.
    ///
    /// `0` is both the sentinel and a legal order value; callers that
    /// append pages treat the result as "next order minus one" either way.
    pub fn find_max_api_page_order(&self, api: &str) -> RepoResult<i32> {
        self.max_order(Some(api))
    }

    /// Highest `order` among portal pages, `0` when there are none.
    pub fn find_max_portal_page_order(&self) -> RepoResult<i32> {
        self.max_order(None)
    }

    /// Deletes a page by id. Idempotent.
    ///
    /// The id is removed from its scope bucket before the primary hash
    /// field is deleted.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        if let Some(record) = self.store.get(id)? {
            self.by_scope.remove(&scope_key(record.api.as_deref()), id)?;
        }
        self.store.delete(id)?;
        debug!(page = %id, "deleted page");
        Ok(())
    }

    fn persist(&self, page: &Page) -> RepoResult<()> {
        let record = PageRecord::from(page);
        self.store.put(&record)?;
        self.by_scope.add(&scope_key(page.api.as_deref()), &page.id)?;
        debug!(page = %page.id, "saved page");
        Ok(())
    }

    fn records_in_scope(&self, api: Option<&str>) -> RepoResult<Vec<PageRecord>> {
        let mut ids = self.by_scope.members(&scope_key(api))?;
        ids.sort_unstable();
        Ok(present(&ids, self.store.multi_get(&ids)?))
    }

    fn max_order(&self, api: Option<&str>) -> RepoResult<i32> {
        let records = self.records_in_scope(api)?;
        Ok(records.iter().map(|r| r.order).max().unwrap_or(0))
    }
}

fn matches(record: &PageRecord, criteria: &PageCriteria) -> bool {
    if let Some(homepage) = criteria.homepage {
        if record.homepage != homepage {
            return false;
        }
    }
    if let Some(published) = criteria.published {
        if record.published != published {
            return false;
        }
    }
    if let Some(name) = criteria.name.as_deref() {
        if record.name != name {
            return false;
        }
    }
    if let Some(parent) = criteria.parent.as_deref() {
        if record.parent_id.as_deref() != Some(parent) {
            return false;
        }
    }
    if let Some(root_parent) = criteria.root_parent {
        if record.is_root() != root_parent {
            return false;
        }
    }
    if let Some(page_type) = criteria.page_type {
        if record.page_type != page_type.as_name() {
            return false;
        }
    }
    true
}
