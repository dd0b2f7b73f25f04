//! # Notes App
//!
//! Demonstrates the document store framework end to end:
//! 1. Starting the [`AppSystem`] from environment configuration.
//! 2. Signing in and writing [`Note`]s and [`Reminder`]s.
//! 3. Watching the signed-in user's notes while they change.
//! 4. Reading back through owner-scoped and key-based fetches.
//!
//! Run with `RUST_LOG=info` (or `debug`) to see the store and client traces.

use docstore_framework::tracing::setup_tracing;
use docstore_framework::StoreConfig;
use docstore_sample::error::AppError;
use docstore_sample::lifecycle::AppSystem;
use docstore_sample::model::{Note, Reminder};
use futures::StreamExt;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_tracing();

    let system = AppSystem::new(&StoreConfig::from_env());

    // Failures inside the clients never surface as errors; log them as they happen.
    let mut feed = system.documents.diagnostics();
    let reporter = tokio::spawn(async move {
        while let Ok(diagnostic) = feed.recv().await {
            warn!(kind = ?diagnostic.kind, record_type = diagnostic.record_type, "Diagnostic received");
        }
    });

    // Nobody signed in yet: owner-scoped reads come back empty.
    let nothing = system.notes.my_notes().await;
    info!(count = nothing.len(), "Notes before sign-in");

    system.session.sign_in("user_1");
    info!(user_id = "user_1", "Signed in");

    let mut watch = system.notes.watch_my_notes().await;
    let initial = watch.next().await.unwrap_or_default();
    info!(count = initial.len(), "Initial snapshot");

    let span = tracing::info_span!("note_creation");
    async {
        system
            .notes
            .add_all(&[
                Note::new("n1", "user_1", "Groceries", "milk, eggs"),
                Note::new("n2", "user_1", "Ideas", "write a store"),
                Note::new("n3", "user_2", "Not mine", "hidden"),
            ])
            .await;
    }
    .instrument(span)
    .await;

    system
        .documents
        .create_one(&Reminder::new("r1", "user_1", "Buy milk", 1_700_000_000))
        .await;

    let mine = system.notes.my_notes().await;
    info!(count = mine.len(), "Notes after creation");

    if let Some(groceries) = mine.iter().find(|n| n.title == "Groceries") {
        if let Some(key) = groceries.document_key.as_deref() {
            system.notes.set_pinned(key, true).await;
        }
    }
    let pinned = system.notes.pinned().await;
    info!(titles = ?pinned.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(), "Pinned notes");

    let ideas: Vec<Note> = mine.iter().filter(|n| n.title == "Ideas").cloned().collect();
    system.notes.remove(&ideas).await;

    // Every batch above changed the watched set; drain what arrived.
    while let Ok(Some(snapshot)) =
        tokio::time::timeout(std::time::Duration::from_millis(50), watch.next()).await
    {
        info!(count = snapshot.len(), "Snapshot pushed");
    }
    drop(watch);

    let reminders: Vec<Reminder> = system.documents.fetch_owned(None).await;
    info!(count = reminders.len(), "Reminders");

    // A key that does not exist is reported, not returned as an error.
    let missing = system.notes.note("does-not-exist").await;
    info!(found = missing.is_some(), "Lookup by key");

    system.session.sign_out();
    system.shutdown().await?;
    reporter.await?;

    info!("Application completed successfully");
    Ok(())
}
