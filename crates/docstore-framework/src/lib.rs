//! # Document Store Framework
//!
//! This crate provides a typed data-access layer over a collection/document store: the kind
//! of database that keeps JSON-like documents in named collections, answers equality queries,
//! and pushes live snapshots to listeners.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Record Layer** ([`DocumentRecord`]) - your domain types and the collection each lives in
//! 2. **Client Layer** ([`DocumentClient`]) - typed fetch / create / upsert / delete / observe
//! 3. **Store Layer** ([`DocumentStore`]) - the backend seam; [`MemoryStoreActor`] is the
//!    in-process implementation, [`mock::MockStore`] the scripted one
//!
//! Identity comes from a [`SessionProvider`]; owner-scoped operations read the signed-in
//! user's id from it and never change it.
//!
//! ## Quick Start
//!
//! ```rust
//! use docstore_framework::{DocumentClient, DocumentRecord, MemoryStoreActor, SessionState, StoreConfig};
//! use futures::StreamExt;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Habit {
//!     id: Option<String>,
//!     owner_id: Option<String>,
//!     name: String,
//!     #[serde(skip)]
//!     document_key: Option<String>,
//! }
//!
//! impl DocumentRecord for Habit {
//!     const COLLECTION: &'static str = "habits";
//!     fn id(&self) -> Option<&str> { self.id.as_deref() }
//!     fn owner_id(&self) -> Option<&str> { self.owner_id.as_deref() }
//!     fn document_key(&self) -> Option<&str> { self.document_key.as_deref() }
//!     fn set_document_key(&mut self, key: String) { self.document_key = Some(key); }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Start the store
//!     let (actor, store) = MemoryStoreActor::new(&StoreConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     // 2. Build the client with its collaborators injected
//!     let session = SessionState::signed_in("user_1");
//!     let client = DocumentClient::new(store, session.clone());
//!
//!     // 3. Observe, then write
//!     let mut habits = client.observe_owned::<Habit>().await;
//!     assert!(habits.next().await.unwrap().is_empty());
//!
//!     client
//!         .create_one(&Habit {
//!             id: Some("h1".into()),
//!             owner_id: Some("user_1".into()),
//!             name: "Stretch".into(),
//!             document_key: None,
//!         })
//!         .await;
//!     assert_eq!(habits.next().await.unwrap()[0].name, "Stretch");
//! }
//! ```
//!
//! ## Failure Model
//!
//! [`DocumentClient`] never returns an error. Reads degrade to empty results, writes complete
//! regardless, and every failure is logged and published on the [`DiagnosticSink`]. See the
//! [`document_client`] module.
//!
//! ## Concurrency Model
//!
//! - The memory store runs in its own Tokio task and processes requests sequentially
//! - The typed client holds no locks; batch writes fan out and join explicitly
//! - Each `observe_owned` call owns exactly one store listener, released on drop
//!
//! ## Testing
//!
//! [`mock::MockStore`] answers store requests from scripted expectations so failure paths can
//! be tested deterministically. See the [`mock`] module.

pub mod actor;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod document_client;
pub mod error;
pub mod message;
pub mod mock;
pub mod record;
pub mod session;
pub mod store;
pub mod tracing;

// Re-export core types for convenience
pub use actor::MemoryStoreActor;
pub use client::StoreClient;
pub use config::StoreConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
pub use document::{Document, DocumentData, FieldFilter, Query, QuerySnapshot};
pub use document_client::{DocumentClient, Snapshots};
pub use error::{RecordError, StoreError};
pub use message::{Response, StoreRequest, StoreStats};
pub use record::{DocumentRecord, ID_FIELD, OWNER_FIELD};
pub use session::{SessionProvider, SessionState};
pub use store::{DocumentStore, Listener};
