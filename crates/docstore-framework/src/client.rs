//! # Store Client
//!
//! The client half of the in-memory store: forwards each [`DocumentStore`] call to the
//! [`MemoryStoreActor`](crate::MemoryStoreActor) and waits for its reply.

use crate::document::{Document, DocumentData, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::message::{StoreRequest, StoreStats};
use crate::store::{DocumentStore, Listener};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A handle for talking to a store actor.
///
/// ## StoreClient
///
/// `StoreClient` holds only the sender half of the actor's request channel, so it is cheap to
/// clone and share across tasks. The actor keeps running while at least one clone is alive.
#[derive(Clone, Debug)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    /// Current collection, document and listener counts.
    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.request(|respond_to| StoreRequest::Stats { respond_to })
            .await
    }
}

#[async_trait]
impl DocumentStore for StoreClient {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.request(|respond_to| StoreRequest::Get {
            collection: collection.to_string(),
            key: key.to_string(),
            respond_to,
        })
        .await
    }

    async fn query(&self, query: Query) -> Result<QuerySnapshot, StoreError> {
        self.request(|respond_to| StoreRequest::Query { query, respond_to })
            .await
    }

    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError> {
        self.request(|respond_to| StoreRequest::Add {
            collection: collection.to_string(),
            data,
            respond_to,
        })
        .await
    }

    async fn set(&self, collection: &str, key: &str, data: DocumentData) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Set {
            collection: collection.to_string(),
            key: key.to_string(),
            data,
            respond_to,
        })
        .await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
            respond_to,
        })
        .await
    }

    async fn listen(&self, query: Query) -> Result<Listener, StoreError> {
        self.request(|respond_to| StoreRequest::Listen { query, respond_to })
            .await
    }
}
