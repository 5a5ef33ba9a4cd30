//! Token repository: CRUD plus the owning-reference index.

use super::present;
use crate::error::{RepoError, RepoResult};
use crate::index::IndexSet;
use crate::model::{Token, TokenRecord};
use crate::store::EntityStore;
use gatehouse_kv::KvBackend;
use std::sync::Arc;
use tracing::debug;

/// Repository for [`Token`] records.
///
/// One derived set per owning reference
/// (`token:reference:{type}:{id}`) holds the reference's token ids.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    store: EntityStore<TokenRecord>,
    by_reference: IndexSet,
}

fn reference_key(reference_type: &str, reference_id: &str) -> String {
    format!("{reference_type}:{reference_id}")
}

impl TokenRepository {
    /// Creates a token repository over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            store: EntityStore::new(Arc::clone(&backend)),
            by_reference: IndexSet::new(backend, "token:reference"),
        }
    }

    /// Persists a new token.
    pub fn create(&self, token: &Token) -> RepoResult<Token> {
        self.persist(token)?;
        Ok(token.clone())
    }

    /// Updates an existing token, typically to bump `last_use_at`.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::PreconditionFailed`] if no token with this id
    /// exists.
    pub fn update(&self, token: &Token) -> RepoResult<Token> {
        if token.id.is_empty() || !self.store.exists(&token.id)? {
            return Err(RepoError::precondition_failed(format!(
                "no token found with id [{}]",
                token.id
            )));
        }
        self.persist(token)?;
        Ok(token.clone())
    }

    /// Point lookup by id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Token>> {
        self.store.get(id)?.map(Token::try_from).transpose()
    }

    /// Every stored token. Full scan.
    pub fn find_all(&self) -> RepoResult<Vec<Token>> {
        self.store.all()?.into_iter().map(Token::try_from).collect()
    }

    /// Tokens owned by one reference.
    pub fn find_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> RepoResult<Vec<Token>> {
        let mut ids = self
            .by_reference
            .members(&reference_key(reference_type, reference_id))?;
        ids.sort_unstable();
        let records = present(&ids, self.store.multi_get(&ids)?);
        records.into_iter().map(Token::try_from).collect()
    }

    /// Deletes a token by id. Idempotent.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        if let Some(record) = self.store.get(id)? {
            self.by_reference.remove(
                &reference_key(&record.reference_type, &record.reference_id),
                id,
            )?;
        }
        self.store.delete(id)?;
        debug!(token = %id, "deleted token");
        Ok(())
    }

    fn persist(&self, token: &Token) -> RepoResult<()> {
        let record = TokenRecord::from(token);
        self.store.put(&record)?;
        self.by_reference.add(
            &reference_key(&token.reference_type, &token.reference_id),
            &token.id,
        )?;
        debug!(token = %token.id, "saved token");
        Ok(())
    }
}
