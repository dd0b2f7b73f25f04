//! # Diagnostics
//!
//! [`DocumentClient`](crate::DocumentClient) never hands an error back to its caller: a failed
//! fetch looks like an empty result and a failed write still completes. To keep that contract
//! observable, every swallowed failure is also published here.
//!
//! ```rust
//! use docstore_framework::{Diagnostic, DiagnosticKind, DiagnosticSink};
//! use std::num::NonZeroUsize;
//!
//! let sink = DiagnosticSink::new(NonZeroUsize::new(16).unwrap());
//! let mut feed = sink.subscribe();
//! sink.publish(Diagnostic::new(DiagnosticKind::MissingKey, "Note", "notes", None, "no key"));
//! assert_eq!(feed.try_recv().unwrap().kind, DiagnosticKind::MissingKey);
//! ```

use crate::config::capacity;
use std::num::NonZeroUsize;
use tokio::sync::broadcast;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An owner-scoped read or subscription ran with nobody signed in.
    SessionAbsent,
    /// The store reported an error.
    Store,
    /// A fetched document could not be decoded and was skipped.
    Decode,
    /// A record could not be encoded; nothing was written.
    Encode,
    /// `upsert` was given a record without a document key.
    MissingKey,
    /// A document looked up by key does not exist.
    NotFound,
}

/// One swallowed failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub record_type: &'static str,
    pub collection: &'static str,
    /// Document key or domain id the failure concerns, when there is one.
    pub subject: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        record_type: &'static str,
        collection: &'static str,
        subject: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            record_type,
            collection,
            subject,
            message: message.into(),
        }
    }
}

/// Broadcast feed of [`Diagnostic`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    sender: broadcast::Sender<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let (sender, _) = broadcast::channel(capacity.get());
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers. With no subscribers the diagnostic is dropped.
    pub fn publish(&self, diagnostic: Diagnostic) {
        let _ = self.sender.send(diagnostic);
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new(capacity(256))
    }
}
