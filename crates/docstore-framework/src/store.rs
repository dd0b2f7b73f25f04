//! # DocumentStore Trait
//!
//! The seam between the typed client and whatever actually holds the documents: the
//! in-memory [`MemoryStoreActor`](crate::MemoryStoreActor), the [`MockStore`](crate::mock::MockStore)
//! used in tests, or an adapter over a remote database SDK.
//!
//! It covers collection-scoped CRUD, one equality query and a change subscription.
//! Consistency, retries and transport belong to the implementor.

use crate::document::{Document, DocumentData, Query, QuerySnapshot};
use crate::error::StoreError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Collection/document storage with queries and live listeners.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document stored at `key`, or `None` if there is none.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Run a query and return its current result set.
    async fn query(&self, query: Query) -> Result<QuerySnapshot, StoreError>;

    /// Every document in `collection`.
    async fn get_all(&self, collection: &str) -> Result<QuerySnapshot, StoreError> {
        self.query(Query::collection(collection)).await
    }

    /// Store `data` under a freshly generated key and return that key.
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError>;

    /// Replace (or create) the document at `key` with `data`.
    async fn set(&self, collection: &str, key: &str, data: DocumentData) -> Result<(), StoreError>;

    /// Remove the document at `key`. Removing a missing key is not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Subscribe to `query`. The returned [`Listener`] yields the current result set first,
    /// then a new one each time the set changes. A consumer that falls behind may only see
    /// the newest set.
    async fn listen(&self, query: Query) -> Result<Listener, StoreError>;
}

type RemoveHook = Box<dyn FnOnce() + Send>;

/// A live query subscription.
///
/// `Listener` is a [`Stream`] of snapshots. It owns its registration: dropping it (or calling
/// [`Listener::remove`]) runs the store's removal hook exactly once, so the subscription never
/// outlives its consumer.
pub struct Listener {
    snapshots: BoxStream<'static, Result<QuerySnapshot, StoreError>>,
    on_remove: Option<RemoveHook>,
}

impl Listener {
    /// Wrap a snapshot stream together with the hook that unregisters it.
    pub fn new(
        snapshots: impl Stream<Item = Result<QuerySnapshot, StoreError>> + Send + 'static,
        on_remove: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            snapshots: snapshots.boxed(),
            on_remove: Some(Box::new(on_remove)),
        }
    }

    /// A listener with nothing to unregister; it ends when `snapshots` does.
    pub fn detached(
        snapshots: impl Stream<Item = Result<QuerySnapshot, StoreError>> + Send + 'static,
    ) -> Self {
        Self {
            snapshots: snapshots.boxed(),
            on_remove: None,
        }
    }

    /// Unregister now. Equivalent to dropping the listener.
    pub fn remove(self) {}
}

impl Stream for Listener {
    type Item = Result<QuerySnapshot, StoreError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.snapshots.poll_next_unpin(cx)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(on_remove) = self.on_remove.take() {
            on_remove();
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("registered", &self.on_remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_listener_yields_pushed_snapshots() {
        let mut listener = Listener::detached(stream::iter(vec![Ok(QuerySnapshot::default())]));

        let first = listener.next().await.unwrap().unwrap();
        assert!(first.is_empty());
        assert!(listener.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_runs_remove_hook_once() {
        let removed = Arc::new(AtomicUsize::new(0));
        let counter = removed.clone();
        let listener = Listener::new(stream::pending(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        listener.remove();

        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }
}
