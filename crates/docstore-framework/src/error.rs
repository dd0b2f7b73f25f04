//! # Framework Errors
//!
//! Two error families live here. [`StoreError`] is what a [`DocumentStore`](crate::DocumentStore)
//! backend reports (transport, permissions, a stopped actor). [`RecordError`] covers the
//! client-side codec between typed records and document bodies.
//!
//! Neither escapes [`DocumentClient`](crate::DocumentClient): the client turns both into
//! log lines and [`Diagnostic`](crate::Diagnostic)s.

/// Errors reported by a document store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Errors raised while converting between a typed record and a document body.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{record_type} did not serialize to a document object")]
    NotAnObject { record_type: &'static str },
    #[error("Document {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
