//! Driven port for persisting imported mosques.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::mosque_record::NewMosque;

/// Errors surfaced by the relational store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A query failed for a reason other than a constraint.
    #[error("query failed: {message}")]
    Query {
        /// Driver error text.
        message: String,
    },
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {message}")]
    UniqueViolation {
        /// Driver error text.
        message: String,
    },
}

/// Port for the `mosques` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MosqueRepository: Send + Sync {
    /// Returns every persisted slug that starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on database failure.
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, RepositoryError>;

    /// Inserts one mosque row and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UniqueViolation`] when the slug is taken,
    /// [`RepositoryError::Query`] on any other database failure.
    async fn insert_mosque(&self, mosque: &NewMosque) -> Result<Uuid, RepositoryError>;
}
