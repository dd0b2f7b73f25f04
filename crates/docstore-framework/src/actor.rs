//! # In-Memory Store Actor
//!
//! This module defines the `MemoryStoreActor`, a complete [`DocumentStore`](crate::DocumentStore)
//! backend that keeps every collection in memory. It implements the "Server" side of the
//! Actor Model: one task owns all documents and listeners and processes requests sequentially.

use crate::client::StoreClient;
use crate::config::StoreConfig;
use crate::document::{Document, DocumentData, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::message::{StoreRequest, StoreStats};
use crate::store::Listener;
use futures::Stream;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

struct ListenerEntry {
    query: Query,
    // Holds the latest snapshot only; a consumer that falls behind skips to it.
    current: watch::Sender<QuerySnapshot>,
}

/// The actor that owns every collection of an in-memory document store.
///
/// # Architecture Note
/// This struct is the "Server" half of the store. It owns the documents, the listener table
/// and the receiving ends of two channels:
///
/// - **requests** (bounded): CRUD, queries, listener registration.
/// - **removals** (unbounded): listener ids sent by a dropped [`Listener`]. Dropping cannot
///   await, so this channel never blocks the sender.
///
/// Removals are drained before the next request is taken, so a listener dropped before a
/// request is issued is always gone by the time that request is answered.
///
/// # Usage Pattern
///
/// ```rust
/// use docstore_framework::{DocumentStore, MemoryStoreActor, StoreConfig};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() {
///     // 1. Create
///     let (actor, store) = MemoryStoreActor::new(&StoreConfig::default());
///
///     // 2. Run
///     tokio::spawn(actor.run());
///
///     // 3. Use
///     let data = json!({ "title": "hello" }).as_object().cloned().unwrap();
///     let key = store.add("notes", data).await.unwrap();
///     assert!(store.get("notes", &key).await.unwrap().is_some());
/// }
/// ```
///
/// # Notifications
///
/// After every successful **Add**, **Set** or **Delete**, each listener on the touched
/// collection recomputes its result set. It is pushed a new snapshot only when that set
/// differs from the last one it was given. Snapshots are not queued: a listener that has not
/// been polled in the meantime only receives the newest set.
pub struct MemoryStoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    removals: mpsc::UnboundedReceiver<u64>,
    removal_sender: mpsc::UnboundedSender<u64>,
    collections: HashMap<String, BTreeMap<String, DocumentData>>,
    listeners: BTreeMap<u64, ListenerEntry>,
    next_listener_id: u64,
    next_key_fn: Box<dyn Fn() -> String + Send + Sync>,
}

impl MemoryStoreActor {
    /// Creates a store actor with random (UUID v4) document keys, plus its client.
    pub fn new(config: &StoreConfig) -> (Self, StoreClient) {
        Self::with_key_generator(config, || uuid::Uuid::new_v4().simple().to_string())
    }

    /// Creates a store actor whose document keys come from `next_key_fn`.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// 1. The `MemoryStoreActor` (the server), which must be run via `.run()`.
    /// 2. The `StoreClient`, which can be cloned and shared to send requests.
    pub fn with_key_generator(
        config: &StoreConfig,
        next_key_fn: impl Fn() -> String + Send + Sync + 'static,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.get());
        let (removal_sender, removals) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            removals,
            removal_sender,
            collections: HashMap::new(),
            listeners: BTreeMap::new(),
            next_listener_id: 1,
            next_key_fn: Box::new(next_key_fn),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop until every [`StoreClient`] has been dropped.
    pub async fn run(mut self) {
        info!("Store started");

        loop {
            tokio::select! {
                biased;
                Some(listener_id) = self.removals.recv() => self.remove_listener(listener_id),
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle(msg),
                    None => break,
                },
            }
        }

        let stats = self.stats();
        info!(
            collections = stats.collections,
            documents = stats.documents,
            listeners = stats.listeners,
            "Shutdown"
        );
    }

    fn handle(&mut self, msg: StoreRequest) {
        match msg {
            StoreRequest::Get {
                collection,
                key,
                respond_to,
            } => {
                let document = self
                    .collections
                    .get(&collection)
                    .and_then(|docs| docs.get(&key))
                    .map(|data| Document::new(key.clone(), data.clone()));
                debug!(%collection, %key, found = document.is_some(), "Get");
                let _ = respond_to.send(Ok(document));
            }
            StoreRequest::Query { query, respond_to } => {
                let snapshot = self.snapshot(&query);
                debug!(collection = %query.collection, filter = ?query.filter, size = snapshot.len(), "Query");
                let _ = respond_to.send(Ok(snapshot));
            }
            StoreRequest::Add {
                collection,
                data,
                respond_to,
            } => {
                let key = (self.next_key_fn)();
                let in_use = self
                    .collections
                    .get(&collection)
                    .is_some_and(|docs| docs.contains_key(&key));
                if key.is_empty() || in_use {
                    warn!(%collection, %key, "Generated key rejected");
                    let _ = respond_to.send(Err(StoreError::Backend(format!(
                        "generated key {key:?} is empty or already in use"
                    ))));
                    return;
                }
                let docs = self.collections.entry(collection.clone()).or_default();
                docs.insert(key.clone(), data);
                info!(%collection, %key, size = docs.len(), "Added");
                self.notify(&collection);
                let _ = respond_to.send(Ok(key));
            }
            StoreRequest::Set {
                collection,
                key,
                data,
                respond_to,
            } => {
                if key.is_empty() {
                    warn!(%collection, "Set rejected: empty key");
                    let _ = respond_to.send(Err(StoreError::Backend(
                        "document key must not be empty".to_string(),
                    )));
                    return;
                }
                let docs = self.collections.entry(collection.clone()).or_default();
                let replaced = docs.insert(key.clone(), data).is_some();
                info!(%collection, %key, replaced, size = docs.len(), "Set");
                self.notify(&collection);
                let _ = respond_to.send(Ok(()));
            }
            StoreRequest::Delete {
                collection,
                key,
                respond_to,
            } => {
                let removed = self
                    .collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.remove(&key))
                    .is_some();
                if removed {
                    info!(%collection, %key, "Deleted");
                    self.notify(&collection);
                } else {
                    debug!(%collection, %key, "Delete: no such document");
                }
                let _ = respond_to.send(Ok(()));
            }
            StoreRequest::Listen { query, respond_to } => {
                let listener = self.add_listener(query);
                let _ = respond_to.send(Ok(listener));
            }
            StoreRequest::Stats { respond_to } => {
                let _ = respond_to.send(Ok(self.stats()));
            }
        }
    }

    fn snapshot(&self, query: &Query) -> QuerySnapshot {
        let documents = self
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(key, data)| Document::new(key.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default();
        QuerySnapshot::new(documents)
    }

    fn add_listener(&mut self, query: Query) -> Listener {
        let id = self.next_listener_id;
        self.next_listener_id += 1;

        let initial = self.snapshot(&query);
        info!(listener_id = id, collection = %query.collection, size = initial.len(), "Listener registered");
        let (current, receiver) = watch::channel(initial);

        self.listeners.insert(id, ListenerEntry { query, current });

        let removals = self.removal_sender.clone();
        Listener::new(latest_snapshots(receiver), move || {
            let _ = removals.send(id);
        })
    }

    fn remove_listener(&mut self, id: u64) {
        if self.listeners.remove(&id).is_some() {
            info!(listener_id = id, remaining = self.listeners.len(), "Listener removed");
        }
    }

    fn notify(&mut self, collection: &str) {
        let ids: Vec<u64> = self
            .listeners
            .iter()
            .filter(|(_, entry)| entry.query.collection == collection)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let Some(query) = self.listeners.get(&id).map(|entry| entry.query.clone()) else {
                continue;
            };
            let snapshot = self.snapshot(&query);
            let Some(entry) = self.listeners.get(&id) else {
                continue;
            };
            if entry.current.is_closed() {
                warn!(listener_id = id, "Listener receiver gone");
                self.listeners.remove(&id);
                continue;
            }
            let size = snapshot.len();
            let changed = entry.current.send_if_modified(|current| {
                if *current == snapshot {
                    return false;
                }
                *current = snapshot;
                true
            });
            if changed {
                debug!(listener_id = id, %collection, size, "Notify");
            }
        }
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            collections: self.collections.len(),
            documents: self.collections.values().map(BTreeMap::len).sum(),
            listeners: self.listeners.len(),
        }
    }
}

/// The snapshot a listener was registered with, then the newest one after each change.
/// Ends when the actor drops the sender.
fn latest_snapshots(
    receiver: watch::Receiver<QuerySnapshot>,
) -> impl Stream<Item = Result<QuerySnapshot, StoreError>> {
    futures::stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first {
            receiver.changed().await.ok()?;
        }
        let snapshot = receiver.borrow_and_update().clone();
        Some((Ok(snapshot), (receiver, false)))
    })
}
