use async_trait::async_trait;
use thiserror::Error;

use super::todo::{Todo, TodoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest insertion first.
    Descending,
    Ascending,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Client for the document collection holding todos, keyed by `id`.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> StoreResult<()>;
    async fn get(&self, id: &TodoId) -> StoreResult<Option<Todo>>;
    /// Ordered by store-assigned insertion time.
    async fn list(&self, order: SortOrder) -> StoreResult<Vec<Todo>>;
    async fn insert(&self, todo: &Todo) -> StoreResult<()>;
    /// Full document replace. `false` when no document has this id.
    async fn replace(&self, todo: &Todo) -> StoreResult<bool>;
    /// `false` when no document has this id.
    async fn delete(&self, id: &TodoId) -> StoreResult<bool>;
}
