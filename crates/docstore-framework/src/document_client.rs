//! # Typed Document Client
//!
//! [`DocumentClient`] maps typed records onto documents in a [`DocumentStore`]. It is generic
//! over the store and the session, and every operation is generic over the record type, so
//! one client serves every collection.
//!
//! ## Failure contract
//!
//! No method returns an error. A failed read returns an empty `Vec` or `None`; a failed write
//! still completes. Each failure is logged and published as a [`Diagnostic`]; subscribe with
//! [`DocumentClient::diagnostics`] to observe them.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::document::{Document, DocumentData, Query, QuerySnapshot};
use crate::error::RecordError;
use crate::record::{record_type, DocumentRecord, ID_FIELD, OWNER_FIELD};
use crate::session::SessionProvider;
use crate::store::{DocumentStore, Listener};
use futures::future::join_all;
use futures::Stream;
use serde_json::Value;
use std::fmt::Display;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Typed access to a document store, scoped by record type and (optionally) by owner.
///
/// # Example
///
/// ```rust
/// use docstore_framework::{DocumentClient, DocumentRecord, MemoryStoreActor, SessionState, StoreConfig};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Note {
///     id: Option<String>,
///     owner_id: Option<String>,
///     title: String,
///     #[serde(skip)]
///     document_key: Option<String>,
/// }
///
/// impl DocumentRecord for Note {
///     const COLLECTION: &'static str = "notes";
///     fn id(&self) -> Option<&str> { self.id.as_deref() }
///     fn owner_id(&self) -> Option<&str> { self.owner_id.as_deref() }
///     fn document_key(&self) -> Option<&str> { self.document_key.as_deref() }
///     fn set_document_key(&mut self, key: String) { self.document_key = Some(key); }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, store) = MemoryStoreActor::new(&StoreConfig::default());
///     tokio::spawn(actor.run());
///
///     let client = DocumentClient::new(store, SessionState::signed_in("user_1"));
///     client
///         .create_one(&Note {
///             id: Some("n1".into()),
///             owner_id: Some("user_1".into()),
///             title: "Groceries".into(),
///             document_key: None,
///         })
///         .await;
///
///     let mine: Vec<Note> = client.fetch_owned(None).await;
///     assert_eq!(mine.len(), 1);
///     assert!(mine[0].document_key.is_some());
/// }
/// ```
#[derive(Clone)]
pub struct DocumentClient<S, P> {
    store: S,
    session: P,
    diagnostics: DiagnosticSink,
}

impl<S: DocumentStore, P: SessionProvider> DocumentClient<S, P> {
    pub fn new(store: S, session: P) -> Self {
        Self::with_diagnostics(store, session, DiagnosticSink::default())
    }

    pub fn with_diagnostics(store: S, session: P, diagnostics: DiagnosticSink) -> Self {
        Self {
            store,
            session,
            diagnostics,
        }
    }

    /// Subscribe to the failures this client swallows.
    pub fn diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &P {
        &self.session
    }

    /// Records of type `T` owned by `owner_id`, or by the signed-in user when `owner_id` is
    /// `None`. With neither, returns an empty `Vec`.
    #[instrument(skip(self), fields(record_type = record_type::<T>()))]
    pub async fn fetch_owned<T: DocumentRecord>(&self, owner_id: Option<&str>) -> Vec<T> {
        let Some(owner_id) = owner_id
            .map(str::to_owned)
            .or_else(|| self.session.current_user_id())
        else {
            report::<T>(
                &self.diagnostics,
                DiagnosticKind::SessionAbsent,
                None,
                "no owner id and nobody signed in",
            );
            return Vec::new();
        };

        let query = Query::collection(T::COLLECTION).where_eq(OWNER_FIELD, owner_id.as_str());
        match self.store.query(query).await {
            Ok(snapshot) => {
                info!(%owner_id, count = snapshot.len(), "Found owned documents");
                decode_snapshot(&self.diagnostics, snapshot)
            }
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Store, Some(owner_id), e);
                Vec::new()
            }
        }
    }

    /// Every record in `T`'s collection.
    #[instrument(skip(self), fields(record_type = record_type::<T>()))]
    pub async fn fetch_all<T: DocumentRecord>(&self) -> Vec<T> {
        match self.store.get_all(T::COLLECTION).await {
            Ok(snapshot) => {
                info!(count = snapshot.len(), "Found documents");
                decode_snapshot(&self.diagnostics, snapshot)
            }
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Store, None, e);
                Vec::new()
            }
        }
    }

    /// The record stored under document key `key`. Missing, undecodable and failed lookups
    /// all come back as `None`.
    #[instrument(skip(self), fields(record_type = record_type::<T>()))]
    pub async fn fetch_one<T: DocumentRecord>(&self, key: &str) -> Option<T> {
        match self.store.get(T::COLLECTION, key).await {
            Ok(Some(document)) => match decode(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    report::<T>(&self.diagnostics, DiagnosticKind::Decode, Some(key.into()), e);
                    None
                }
            },
            Ok(None) => {
                report::<T>(
                    &self.diagnostics,
                    DiagnosticKind::NotFound,
                    Some(key.into()),
                    "document does not exist",
                );
                None
            }
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Store, Some(key.into()), e);
                None
            }
        }
    }

    /// Overwrite the document at `record`'s document key with `record`.
    ///
    /// A record without a document key is left alone: nothing is written.
    pub async fn upsert<T: DocumentRecord>(&self, record: &T) {
        let Some(key) = record.document_key() else {
            report::<T>(
                &self.diagnostics,
                DiagnosticKind::MissingKey,
                record.id().map(str::to_owned),
                "record has no document key; nothing written",
            );
            return;
        };

        let data = match encode(record) {
            Ok(data) => data,
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Encode, Some(key.into()), e);
                return;
            }
        };

        match self.store.set(T::COLLECTION, key, data).await {
            Ok(()) => debug!(record_type = record_type::<T>(), %key, "Upserted"),
            Err(e) => report::<T>(&self.diagnostics, DiagnosticKind::Store, Some(key.into()), e),
        }
    }

    /// Store `record` as a new document under a store-generated key.
    pub async fn create_one<T: DocumentRecord>(&self, record: &T) {
        let subject = record.id().map(str::to_owned);
        let data = match encode(record) {
            Ok(data) => data,
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Encode, subject, e);
                return;
            }
        };

        match self.store.add(T::COLLECTION, data).await {
            Ok(key) => debug!(record_type = record_type::<T>(), %key, id = ?subject, "Created"),
            Err(e) => report::<T>(&self.diagnostics, DiagnosticKind::Store, subject, e),
        }
    }

    /// Create every record concurrently; returns once all of them have finished.
    #[instrument(skip_all, fields(record_type = record_type::<T>(), count = records.len()))]
    pub async fn create_many<T: DocumentRecord>(&self, records: &[T]) {
        join_all(records.iter().map(|record| self.create_one(record))).await;
        info!("Create batch finished");
    }

    /// Delete the stored document of each record, located by domain id.
    ///
    /// Records without an id, or whose id matches no document, are skipped. Returns once
    /// every attempt has finished.
    #[instrument(skip_all, fields(record_type = record_type::<T>(), count = records.len()))]
    pub async fn delete_many<T: DocumentRecord>(&self, records: &[T]) {
        join_all(records.iter().map(|record| self.delete_matching(record))).await;
        info!("Delete batch finished");
    }

    async fn delete_matching<T: DocumentRecord>(&self, record: &T) {
        let Some(id) = record.id() else {
            debug!(record_type = record_type::<T>(), "No domain id; skipping delete");
            return;
        };

        let query = Query::collection(T::COLLECTION).where_eq(ID_FIELD, id);
        let snapshot = match self.store.query(query).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Store, Some(id.into()), e);
                return;
            }
        };

        // Domain ids are expected to be unique; only the first match is removed.
        let Some(document) = snapshot.documents.into_iter().next() else {
            debug!(record_type = record_type::<T>(), %id, "No document matches; skipping delete");
            return;
        };

        match self.store.delete(T::COLLECTION, &document.key).await {
            Ok(()) => debug!(record_type = record_type::<T>(), %id, key = %document.key, "Deleted"),
            Err(e) => report::<T>(&self.diagnostics, DiagnosticKind::Store, Some(id.into()), e),
        }
    }

    /// Live view of the signed-in user's records of type `T`.
    ///
    /// The stream yields the full current list, then a fresh full list after every change to
    /// it. With nobody signed in it yields one empty list and ends. Dropping the stream
    /// unregisters the underlying store listener.
    #[instrument(skip(self), fields(record_type = record_type::<T>()))]
    pub async fn observe_owned<T: DocumentRecord>(&self) -> Snapshots<T> {
        let Some(owner_id) = self.session.current_user_id() else {
            report::<T>(
                &self.diagnostics,
                DiagnosticKind::SessionAbsent,
                None,
                "nobody signed in; nothing to observe",
            );
            return Snapshots::empty(self.diagnostics.clone());
        };

        let query = Query::collection(T::COLLECTION).where_eq(OWNER_FIELD, owner_id.as_str());
        match self.store.listen(query).await {
            Ok(listener) => {
                info!(%owner_id, "Observing owned documents");
                Snapshots::live(listener, self.diagnostics.clone())
            }
            Err(e) => {
                report::<T>(&self.diagnostics, DiagnosticKind::Store, Some(owner_id), e);
                Snapshots::empty(self.diagnostics.clone())
            }
        }
    }
}

enum SnapshotsState {
    Empty,
    Live(Listener),
    Done,
}

/// Stream of decoded snapshots returned by [`DocumentClient::observe_owned`].
///
/// Owns the store [`Listener`]; dropping `Snapshots` ends the subscription.
pub struct Snapshots<T> {
    state: SnapshotsState,
    diagnostics: DiagnosticSink,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Snapshots<T> {
    fn empty(diagnostics: DiagnosticSink) -> Self {
        Self {
            state: SnapshotsState::Empty,
            diagnostics,
            _marker: PhantomData,
        }
    }

    fn live(listener: Listener, diagnostics: DiagnosticSink) -> Self {
        Self {
            state: SnapshotsState::Live(listener),
            diagnostics,
            _marker: PhantomData,
        }
    }

    /// Whether a store listener is still attached.
    pub fn is_live(&self) -> bool {
        matches!(self.state, SnapshotsState::Live(_))
    }
}

impl<T: DocumentRecord> Stream for Snapshots<T> {
    type Item = Vec<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = match &mut this.state {
            SnapshotsState::Empty => None,
            SnapshotsState::Live(listener) => match Pin::new(listener).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(item) => Some(item),
            },
            SnapshotsState::Done => return Poll::Ready(None),
        };

        match polled {
            // No session (or the listener could not be registered): one empty list, then done.
            None => {
                this.state = SnapshotsState::Done;
                Poll::Ready(Some(Vec::new()))
            }
            Some(Some(Ok(snapshot))) => {
                Poll::Ready(Some(decode_snapshot(&this.diagnostics, snapshot)))
            }
            Some(Some(Err(e))) => {
                report::<T>(&this.diagnostics, DiagnosticKind::Store, None, e);
                Poll::Ready(Some(Vec::new()))
            }
            Some(None) => {
                this.state = SnapshotsState::Done;
                Poll::Ready(None)
            }
        }
    }
}

impl<T> std::fmt::Debug for Snapshots<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshots")
            .field("record_type", &record_type::<T>())
            .field("live", &self.is_live())
            .finish()
    }
}

fn encode<T: DocumentRecord>(record: &T) -> Result<DocumentData, RecordError> {
    match serde_json::to_value(record)? {
        Value::Object(data) => Ok(data),
        _ => Err(RecordError::NotAnObject {
            record_type: record_type::<T>(),
        }),
    }
}

fn decode<T: DocumentRecord>(document: Document) -> Result<T, RecordError> {
    let Document { key, data } = document;
    match serde_json::from_value::<T>(Value::Object(data)) {
        Ok(mut record) => {
            record.set_document_key(key);
            Ok(record)
        }
        Err(source) => Err(RecordError::Decode { key, source }),
    }
}

fn decode_snapshot<T: DocumentRecord>(diagnostics: &DiagnosticSink, snapshot: QuerySnapshot) -> Vec<T> {
    snapshot
        .documents
        .into_iter()
        .filter_map(|document| {
            let key = document.key.clone();
            match decode(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    report::<T>(diagnostics, DiagnosticKind::Decode, Some(key), e);
                    None
                }
            }
        })
        .collect()
}

fn report<T: DocumentRecord>(
    diagnostics: &DiagnosticSink,
    kind: DiagnosticKind,
    subject: Option<String>,
    error: impl Display,
) {
    let record_type = record_type::<T>();
    let collection = T::COLLECTION;
    let message = error.to_string();

    match kind {
        DiagnosticKind::SessionAbsent => {
            debug!(record_type, collection, "No session; returning empty result")
        }
        DiagnosticKind::Store => {
            warn!(record_type, collection, subject = ?subject, error = %message, "Store request failed")
        }
        DiagnosticKind::Decode => {
            warn!(record_type, collection, subject = ?subject, error = %message, "Skipping undecodable document")
        }
        DiagnosticKind::Encode => {
            warn!(record_type, collection, subject = ?subject, error = %message, "Encode failed; nothing written")
        }
        DiagnosticKind::MissingKey => {
            warn!(record_type, collection, subject = ?subject, "Upsert without document key ignored")
        }
        DiagnosticKind::NotFound => {
            warn!(record_type, collection, subject = ?subject, "Document does not exist")
        }
    }

    diagnostics.publish(Diagnostic::new(kind, record_type, collection, subject, message));
}
