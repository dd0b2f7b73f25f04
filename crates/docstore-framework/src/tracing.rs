//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Call it once from a binary; library code only emits events.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format without the crate/module prefix
//! (`with_target(false)`); log lines identify themselves through structured fields such as
//! `record_type` and `collection` instead.
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: startup, shutdown and final sizes of the memory store
//! - **Store operations**: Get, Query, Added, Set, Deleted, listener registration and removal
//! - **Client operations**: spans per typed operation (`fetch_owned`, `delete_many`, …)
//! - **Swallowed failures**: every store, decode and encode failure as a `WARN` with the
//!   record type, collection and document key or id
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Every request and notification
//! RUST_LOG=debug cargo run
//!
//! # Only the typed client
//! RUST_LOG=docstore_framework::document_client=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Store started
//! INFO Signed in user_id="user_1"
//! INFO create_many{record_type="Note" count=3}: Create batch finished
//! INFO fetch_owned{record_type="Note" owner_id=None}: Found owned documents owner_id=user_1 count=3
//! INFO observe_owned{record_type="Note"}: Listener registered listener_id=1 collection=notes size=3
//! WARN fetch_one{record_type="Note" key="nope"}: Document does not exist record_type="Note" collection="notes" subject=Some("nope")
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`], but writes through the test harness and tolerates being called
/// more than once.
pub fn setup_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .try_init();
}
