//! # Store Messages
//!
//! This module defines the message types exchanged between a [`StoreClient`](crate::StoreClient)
//! and the [`MemoryStoreActor`](crate::MemoryStoreActor).

use crate::document::{Document, DocumentData, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::store::Listener;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Counters reported by [`StoreRequest::Stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub collections: usize,
    pub documents: usize,
    pub listeners: usize,
}

/// Request sent to the store actor.
///
/// # Mapping to the store contract
/// Each variant mirrors one [`DocumentStore`](crate::DocumentStore) operation, so the client
/// half stays a thin forwarder and all state lives on the actor side:
///
/// - **Get**: read one document by key.
/// - **Query**: read the current result set of a query.
/// - **Add** / **Set** / **Delete**: mutate one document; listeners are notified afterwards.
/// - **Listen**: register a live query and hand back its [`Listener`].
/// - **Stats**: inspection for tests and shutdown logs.
#[derive(Debug)]
pub enum StoreRequest {
    Get {
        collection: String,
        key: String,
        respond_to: Response<Option<Document>>,
    },
    Query {
        query: Query,
        respond_to: Response<QuerySnapshot>,
    },
    Add {
        collection: String,
        data: DocumentData,
        respond_to: Response<String>,
    },
    Set {
        collection: String,
        key: String,
        data: DocumentData,
        respond_to: Response<()>,
    },
    Delete {
        collection: String,
        key: String,
        respond_to: Response<()>,
    },
    Listen {
        query: Query,
        respond_to: Response<Listener>,
    },
    Stats {
        respond_to: Response<StoreStats>,
    },
}
