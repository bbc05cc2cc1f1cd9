use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use habitsync_domain::shared::UserId;
use habitsync_domain::store::{DocumentStore, SyncedEntity};

/// Local cache of one remote collection, scoped to a single user and
/// kept fresh by a change-event subscription.
///
/// Every relevant event triggers a full refetch rather than an
/// incremental patch; per-user habit and completion counts are small
/// enough that simplicity wins. Fetch failures keep the last-known-good
/// contents (stale-but-available over fail-fast). Document order is
/// whatever the store returned last; callers order locally.
pub struct SyncedCollection<T: SyncedEntity> {
    store: Arc<dyn DocumentStore>,
    items: Arc<RwLock<Vec<T>>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl<T: SyncedEntity> SyncedCollection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            items: Arc::new(RwLock::new(Vec::new())),
            watcher: Mutex::new(None),
        }
    }

    /// Fetch the user's documents and start watching the collection's
    /// change channel. Replaces any previous watcher, so re-activating
    /// for a different user cannot leak the old subscription.
    pub async fn activate(&self, user_id: &UserId) {
        self.deactivate().await;

        // Subscribe before the initial fetch; events landing in between
        // are then seen by the watcher instead of lost.
        let mut feed = self.store.subscribe(T::COLLECTION);
        Self::refetch(&self.store, &self.items, user_id).await;

        let store = Arc::clone(&self.store);
        let items = Arc::clone(&self.items);
        let user_id = user_id.clone();

        let handle = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(event) => {
                        if event.collection == T::COLLECTION
                            && T::REFRESH_ON.contains(&event.kind)
                        {
                            debug!(
                                collection = T::COLLECTION,
                                kind = ?event.kind,
                                "change event, refetching"
                            );
                            Self::refetch(&store, &items, &user_id).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            collection = T::COLLECTION,
                            skipped, "change feed lagged, refetching"
                        );
                        Self::refetch(&store, &items, &user_id).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        *self.watcher.lock().await = Some(handle);
        info!(collection = T::COLLECTION, "collection activated");
    }

    /// Stop watching. Idempotent; awaits the watcher's termination so no
    /// stale-user event can be delivered after the call returns.
    pub async fn deactivate(&self) {
        if let Some(handle) = self.watcher.lock().await.take() {
            handle.abort();
            let _ = handle.await;
            info!(collection = T::COLLECTION, "collection deactivated");
        }
    }

    /// Snapshot of the last-known-good contents, in fetch order.
    pub async fn items(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// Explicit refetch for callers that cannot wait for an event.
    pub async fn refresh(&self, user_id: &UserId) {
        Self::refetch(&self.store, &self.items, user_id).await;
    }

    async fn refetch(
        store: &Arc<dyn DocumentStore>,
        items: &Arc<RwLock<Vec<T>>>,
        user_id: &UserId,
    ) {
        let documents = match store.list(T::COLLECTION, &T::scope_filters(user_id)).await {
            Ok(documents) => documents,
            Err(e) => {
                // Background failure: keep serving stale contents.
                warn!(collection = T::COLLECTION, error = %e, "fetch failed");
                return;
            }
        };

        let mut decoded = Vec::with_capacity(documents.len());
        for document in &documents {
            match T::decode(document) {
                Ok(entity) => decoded.push(entity),
                Err(e) => {
                    warn!(
                        collection = T::COLLECTION,
                        document = %document.id,
                        error = %e,
                        "skipping undecodable document"
                    );
                }
            }
        }

        *items.write().await = decoded;
    }
}
