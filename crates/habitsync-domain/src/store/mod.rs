use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::shared::{DomainError, UserId};

/// A raw document as held by the remote store: an opaque id plus an
/// untyped field bag. Fields stay untyped only up to the decode step of
/// the entity that owns the collection.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Query filters supported by the remote store.
#[derive(Debug, Clone)]
pub enum Filter {
    Equal(String, Value),
    GreaterThanEqual(String, Value),
    Limit(usize),
}

impl Filter {
    pub fn equal(field: &str, value: impl Into<Value>) -> Self {
        Self::Equal(field.to_string(), value.into())
    }

    pub fn greater_than_equal(field: &str, value: impl Into<Value>) -> Self {
        Self::GreaterThanEqual(field.to_string(), value.into())
    }

    pub fn limit(count: usize) -> Self {
        Self::Limit(count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// Push notification delivered on a collection's change channel.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub collection: String,
    pub document: Document,
}

pub type ChangeFeed = broadcast::Receiver<ChangeEvent>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Document already exists: {0}")]
    Conflict(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => DomainError::NotFound(msg),
            other => DomainError::Store(other.to_string()),
        }
    }
}

/// Remote document database, consumed abstractly. Create/update/delete
/// each publish a matching event on the collection's change channel.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError>;

    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Document, StoreError>;

    /// Partial update; the given fields are merged over the stored ones.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Document, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Open the change channel scoped to one collection. Dropping the
    /// returned receiver closes the subscription.
    fn subscribe(&self, collection: &str) -> ChangeFeed;
}

/// Binds an entity type to the remote collection it lives in.
///
/// The decode step here is the only place untyped document fields become
/// typed values; nothing past it trusts raw fields.
pub trait SyncedEntity: Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Event kinds that invalidate the local cache of this collection.
    const REFRESH_ON: &'static [ChangeKind];

    /// Filters scoping the bulk fetch to one user.
    fn scope_filters(user_id: &UserId) -> Vec<Filter>;

    fn decode(document: &Document) -> Result<Self, DomainError>;
}
