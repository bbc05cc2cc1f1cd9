use std::collections::HashMap;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

use habitsync_domain::store::{
    ChangeEvent, ChangeFeed, ChangeKind, Document, DocumentStore, Filter, StoreError,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Per-collection document lists in insertion order, with a broadcast
/// change channel per collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    channels: StdMutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, kind: ChangeKind, collection: &str, document: Document) {
        let sender = {
            let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
            channels.get(collection).cloned()
        };
        if let Some(sender) = sender {
            // Nobody listening is fine.
            let _ = sender.send(ChangeEvent {
                kind,
                collection: collection.to_string(),
                document,
            });
        }
    }

    fn matches(document: &Document, filter: &Filter) -> bool {
        match filter {
            Filter::Equal(field, expected) => document.fields.get(field) == Some(expected),
            Filter::GreaterThanEqual(field, bound) => {
                match (document.fields.get(field), bound) {
                    (Some(Value::String(actual)), Value::String(bound)) => {
                        actual.as_str() >= bound.as_str()
                    }
                    (Some(Value::Number(actual)), Value::Number(bound)) => {
                        match (actual.as_f64(), bound.as_f64()) {
                            (Some(actual), Some(bound)) => actual >= bound,
                            _ => false,
                        }
                    }
                    _ => false,
                }
            }
            Filter::Limit(_) => true,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let documents = collections.get(collection).cloned().unwrap_or_default();

        let limit = filters
            .iter()
            .find_map(|f| match f {
                Filter::Limit(count) => Some(*count),
                _ => None,
            })
            .unwrap_or(usize::MAX);

        Ok(documents
            .into_iter()
            .filter(|doc| filters.iter().all(|f| Self::matches(doc, f)))
            .take(limit)
            .collect())
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Document, StoreError> {
        let document = Document::new(id, fields);
        {
            let mut collections = self.collections.write().await;
            let documents = collections.entry(collection.to_string()).or_default();
            if documents.iter().any(|doc| doc.id == id) {
                return Err(StoreError::Conflict(id.to_string()));
            }
            documents.push(document.clone());
        }

        self.publish(ChangeKind::Create, collection, document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Document, StoreError> {
        let updated = {
            let mut collections = self.collections.write().await;
            let documents = collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let document = documents
                .iter_mut()
                .find(|doc| doc.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            match (document.fields.as_object_mut(), fields.as_object()) {
                (Some(existing), Some(patch)) => {
                    for (key, value) in patch {
                        existing.insert(key.clone(), value.clone());
                    }
                }
                _ => document.fields = fields,
            }
            document.clone()
        };

        self.publish(ChangeKind::Update, collection, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.collections.write().await;
            let documents = collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let index = documents
                .iter()
                .position(|doc| doc.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            documents.remove(index)
        };

        self.publish(ChangeKind::Delete, collection, removed);
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> ChangeFeed {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(EVENT_CHANNEL_CAPACITY).0)
            .subscribe()
    }
}
