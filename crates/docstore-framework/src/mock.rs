//! # Mock Store & Testing Guide
//!
//! [`MockStore`] hands out a real [`StoreClient`] whose requests are answered from a queue of
//! scripted expectations instead of an actual store. Use it to drive
//! [`DocumentClient`](crate::DocumentClient) into failure paths that a healthy
//! [`MemoryStoreActor`](crate::MemoryStoreActor) never produces (permission errors, outages,
//! corrupt documents).
//!
//! ## When to use Mocks vs the Memory Store
//!
//! | Feature | MockStore | MemoryStoreActor |
//! |---------|-----------|------------------|
//! | **State** | None (scripted replies) | Real collections and listeners |
//! | **Error Injection** | Easy (`return_err`) | Not possible |
//! | **Use Case** | Failure handling, exact request sequences | Behaviour end to end |
//!
//! ## Swallowed errors
//!
//! The typed client never surfaces store errors, so a mock that panicked on an unexpected
//! request would go unnoticed. Instead the mock answers such requests with
//! [`StoreError::Backend`] and remembers them; [`MockStore::verify`] fails if any occurred or
//! if scripted expectations were left unused.
//!
//! ```rust
//! use docstore_framework::mock::MockStore;
//! use docstore_framework::{DocumentStore, StoreError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::new();
//!     mock.expect_get("k1").return_err(StoreError::Unavailable("offline".into()));
//!
//!     let store = mock.client();
//!     let result = store.get("notes", "k1").await;
//!     assert!(matches!(result, Err(StoreError::Unavailable(_))));
//!
//!     mock.verify();
//! }
//! ```
//!
//! ## Receiver-level assertions
//!
//! [`create_mock_store`] returns a client and the raw request receiver, for tests that need to
//! hold replies back (e.g. to control the order in which concurrent writes complete) or to
//! inspect what was written.

use crate::client::StoreClient;
use crate::document::{Document, DocumentData, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::message::{Response, StoreRequest};
use crate::store::Listener;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Snapshots a scripted listener replays, in order.
pub type ScriptedSnapshots = Vec<Result<QuerySnapshot, StoreError>>;

/// Represents an expected request to the mock store.
enum Expectation {
    Get {
        key: String,
        response: Result<Option<Document>, StoreError>,
    },
    Query {
        response: Result<QuerySnapshot, StoreError>,
    },
    Add {
        response: Result<String, StoreError>,
    },
    Set {
        response: Result<(), StoreError>,
    },
    Delete {
        response: Result<(), StoreError>,
    },
    Listen {
        response: Result<ScriptedSnapshots, StoreError>,
    },
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

/// A mock store with expectation tracking for fluent testing.
///
/// Expectations are consumed in FIFO order, one per request.
pub struct MockStore {
    client: StoreClient,
    expectations: Expectations,
    unexpected: Unexpected,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Creates a new mock store with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(100);
        let expectations: Expectations = Arc::new(Mutex::new(VecDeque::new()));
        let unexpected: Unexpected = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let unexpected_clone = unexpected.clone();

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();
                answer(request, expectation, &unexpected_clone);
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            unexpected,
            _handle: handle,
        }
    }

    /// Returns a store client wired to this mock.
    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    /// Expects a `get` of document `key`.
    pub fn expect_get(&mut self, key: impl Into<String>) -> ExpectationBuilder<Option<Document>> {
        let key = key.into();
        self.builder(move |response| Expectation::Get { key, response })
    }

    /// Expects a `query` (or `get_all`).
    pub fn expect_query(&mut self) -> ExpectationBuilder<QuerySnapshot> {
        self.builder(|response| Expectation::Query { response })
    }

    /// Expects an `add`; `return_ok` takes the generated key.
    pub fn expect_add(&mut self) -> ExpectationBuilder<String> {
        self.builder(|response| Expectation::Add { response })
    }

    /// Expects a `set`.
    pub fn expect_set(&mut self) -> ExpectationBuilder<()> {
        self.builder(|response| Expectation::Set { response })
    }

    /// Expects a `delete`.
    pub fn expect_delete(&mut self) -> ExpectationBuilder<()> {
        self.builder(|response| Expectation::Delete { response })
    }

    /// Expects a `listen`; the listener replays the scripted snapshots and then ends.
    pub fn expect_listen(&mut self) -> ExpectationBuilder<ScriptedSnapshots> {
        self.builder(|response| Expectation::Listen { response })
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let unexpected = self.unexpected.lock().unwrap();
        if !unexpected.is_empty() {
            panic!("Unexpected store requests: {:?}", *unexpected);
        }
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn builder<R>(
        &self,
        build: impl FnOnce(Result<R, StoreError>) -> Expectation + Send + 'static,
    ) -> ExpectationBuilder<R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            build: Box::new(build),
        }
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<R> {
    expectations: Expectations,
    build: Box<dyn FnOnce(Result<R, StoreError>) -> Expectation + Send>,
}

impl<R> ExpectationBuilder<R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, StoreError>) {
        let expectation = (self.build)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

impl ExpectationBuilder<ScriptedSnapshots> {
    /// Register the listener and replay `snapshots` on it.
    pub fn return_snapshots(self, snapshots: ScriptedSnapshots) {
        self.return_ok(snapshots);
    }
}

type Unexpected = Arc<Mutex<Vec<String>>>;

/// Reply to `request` from `expectation`. Mismatches are recorded *before* the reply goes out,
/// so a caller that has its answer can immediately `verify()`.
fn answer(request: StoreRequest, expectation: Option<Expectation>, unexpected: &Unexpected) {
    match (request, expectation) {
        (
            StoreRequest::Get {
                collection,
                key,
                respond_to,
            },
            Some(Expectation::Get {
                key: expected,
                response,
            }),
        ) => {
            if key == expected {
                let _ = respond_to.send(response);
            } else {
                record(unexpected, format!("get {collection}/{key}, expected key {expected:?}"));
                let _ = respond_to.send(Err(unexpected_request()));
            }
        }
        (StoreRequest::Query { respond_to, .. }, Some(Expectation::Query { response })) => {
            let _ = respond_to.send(response);
        }
        (StoreRequest::Add { respond_to, .. }, Some(Expectation::Add { response })) => {
            let _ = respond_to.send(response);
        }
        (StoreRequest::Set { respond_to, .. }, Some(Expectation::Set { response })) => {
            let _ = respond_to.send(response);
        }
        (StoreRequest::Delete { respond_to, .. }, Some(Expectation::Delete { response })) => {
            let _ = respond_to.send(response);
        }
        (StoreRequest::Listen { respond_to, .. }, Some(Expectation::Listen { response })) => {
            let listener =
                response.map(|snapshots| Listener::detached(futures::stream::iter(snapshots)));
            let _ = respond_to.send(listener);
        }
        (request, _) => fail_unexpected(request, unexpected),
    }
}

fn record(unexpected: &Unexpected, description: String) {
    unexpected.lock().unwrap().push(description);
}

fn unexpected_request() -> StoreError {
    StoreError::Backend("unexpected request".to_string())
}

fn fail_unexpected(request: StoreRequest, unexpected: &Unexpected) {
    match request {
        StoreRequest::Get {
            collection,
            key,
            respond_to,
        } => {
            record(unexpected, format!("get {collection}/{key}"));
            let _ = respond_to.send(Err(unexpected_request()));
        }
        StoreRequest::Query { query, respond_to } => {
            record(unexpected, format!("query {query:?}"));
            let _ = respond_to.send(Err(unexpected_request()));
        }
        StoreRequest::Add {
            collection,
            respond_to,
            ..
        } => {
            record(unexpected, format!("add {collection}"));
            let _ = respond_to.send(Err(unexpected_request()));
        }
        StoreRequest::Set {
            collection,
            key,
            respond_to,
            ..
        } => {
            record(unexpected, format!("set {collection}/{key}"));
            let _ = respond_to.send(Err(unexpected_request()));
        }
        StoreRequest::Delete {
            collection,
            key,
            respond_to,
        } => {
            record(unexpected, format!("delete {collection}/{key}"));
            let _ = respond_to.send(Err(unexpected_request()));
        }
        StoreRequest::Listen { query, respond_to } => {
            record(unexpected, format!("listen {query:?}"));
            let _ = respond_to.send(Err(unexpected_request()));
        }
        StoreRequest::Stats { respond_to } => {
            record(unexpected, "stats".to_string());
            let _ = respond_to.send(Err(unexpected_request()));
        }
    }
}

// =============================================================================
// RECEIVER-LEVEL HELPERS
// =============================================================================

/// Creates a store client and the receiver its requests arrive on.
///
/// # Testing Strategy
/// The test plays the store: it pulls requests off `receiver`, inspects them, and replies
/// whenever (and in whatever order) it likes.
pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, String, Response<Option<Document>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get {
            collection,
            key,
            respond_to,
        }) => Some((collection, key, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Set request
pub async fn expect_set(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, String, DocumentData, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Set {
            collection,
            key,
            data,
            respond_to,
        }) => Some((collection, key, data, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Add request
pub async fn expect_add(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, DocumentData, Response<String>)> {
    match receiver.recv().await {
        Some(StoreRequest::Add {
            collection,
            data,
            respond_to,
        }) => Some((collection, data, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request
pub async fn expect_query(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Query, Response<QuerySnapshot>)> {
    match receiver.recv().await {
        Some(StoreRequest::Query { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, String, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Delete {
            collection,
            key,
            respond_to,
        }) => Some((collection, key, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_store_with_expectations() {
        let mut mock = MockStore::new();
        mock.expect_add().return_ok("k1".to_string());
        mock.expect_get("k1").return_ok(None);

        let store = mock.client();
        let data = json!({ "title": "x" }).as_object().cloned().unwrap();
        assert_eq!(store.add("notes", data).await.unwrap(), "k1");
        assert!(store.get("notes", "k1").await.unwrap().is_none());

        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_listen_replays_snapshots() {
        let mut mock = MockStore::new();
        mock.expect_listen()
            .return_snapshots(vec![Ok(QuerySnapshot::default())]);

        let mut listener = mock
            .client()
            .listen(Query::collection("notes"))
            .await
            .unwrap();
        assert!(listener.next().await.unwrap().unwrap().is_empty());
        assert!(listener.next().await.is_none());

        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected store requests")]
    async fn test_verify_reports_unexpected_requests() {
        let mock = MockStore::new();
        let result = mock.client().delete("notes", "k1").await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_receiver_level_helpers() {
        let (store, mut receiver) = create_mock_store(10);

        let add_task = tokio::spawn(async move {
            let data = json!({ "title": "x" }).as_object().cloned().unwrap();
            store.add("notes", data).await
        });

        let (collection, data, responder) = expect_add(&mut receiver)
            .await
            .expect("Expected Add request");
        assert_eq!(collection, "notes");
        assert_eq!(data.get("title"), Some(&json!("x")));
        responder.send(Ok("k7".to_string())).unwrap();

        assert_eq!(add_task.await.unwrap().unwrap(), "k7");
    }
}
