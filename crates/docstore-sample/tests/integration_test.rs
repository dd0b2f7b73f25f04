use docstore_framework::{DiagnosticKind, StoreConfig};
use docstore_sample::lifecycle::AppSystem;
use docstore_sample::model::{Note, Reminder};
use futures::StreamExt;

fn titles(notes: &[Note]) -> Vec<&str> {
    let mut titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
    titles.sort();
    titles
}

/// Full end-to-end run through the real store.
#[tokio::test]
async fn test_full_notes_flow() {
    let system = AppSystem::new(&StoreConfig::default());
    system.session.sign_in("alice");

    system
        .notes
        .add_all(&[
            Note::new("n1", "alice", "Groceries", "milk"),
            Note::new("n2", "alice", "Ideas", "store"),
            Note::new("n3", "bob", "Bob's", "private"),
        ])
        .await;

    let mine = system.notes.my_notes().await;
    assert_eq!(titles(&mine), vec!["Groceries", "Ideas"]);
    assert!(mine.iter().all(|n| n.document_key.is_some()));

    let bobs = system.notes.notes_of("bob").await;
    assert_eq!(titles(&bobs), vec!["Bob's"]);

    // Pin by key, then read back.
    let groceries = mine.iter().find(|n| n.title == "Groceries").unwrap();
    let key = groceries.document_key.clone().unwrap();
    assert!(system.notes.set_pinned(&key, true).await);
    let reread = system.notes.note(&key).await.unwrap();
    assert!(reread.pinned);
    assert_eq!(reread.body, "milk");
    assert_eq!(titles(&system.notes.pinned().await), vec!["Groceries"]);

    // Delete by domain id.
    system.notes.remove(&[Note::new("n2", "alice", "", "")]).await;
    assert_eq!(titles(&system.notes.my_notes().await), vec!["Groceries"]);

    system.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_signing_in_changes_owner_scope() {
    let system = AppSystem::default();
    system
        .notes
        .add_all(&[
            Note::new("a", "alice", "Alice's", ""),
            Note::new("b", "bob", "Bob's", ""),
        ])
        .await;

    assert!(system.notes.my_notes().await.is_empty());

    system.session.sign_in("alice");
    assert_eq!(titles(&system.notes.my_notes().await), vec!["Alice's"]);

    system.session.sign_in("bob");
    assert_eq!(titles(&system.notes.my_notes().await), vec!["Bob's"]);

    system.session.sign_out();
    assert!(system.notes.my_notes().await.is_empty());

    system.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_watch_my_notes_follows_changes() {
    let system = AppSystem::default();
    system.session.sign_in("alice");

    let mut watch = system.notes.watch_my_notes().await;
    assert!(watch.next().await.unwrap().is_empty());

    system.notes.add(&Note::new("n1", "alice", "First", "")).await;
    assert_eq!(titles(&watch.next().await.unwrap()), vec!["First"]);

    system.notes.add(&Note::new("n2", "alice", "Second", "")).await;
    assert_eq!(titles(&watch.next().await.unwrap()), vec!["First", "Second"]);

    system.notes.remove(&[Note::new("n1", "alice", "", "")]).await;
    assert_eq!(titles(&watch.next().await.unwrap()), vec!["Second"]);

    drop(watch);
    system.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_watch_without_session_yields_one_empty_list() {
    let system = AppSystem::default();
    let mut feed = system.documents.diagnostics();

    let mut watch = system.notes.watch_my_notes().await;
    assert!(!watch.is_live());
    assert!(watch.next().await.unwrap().is_empty());
    assert!(watch.next().await.is_none());

    assert_eq!(feed.recv().await.unwrap().kind, DiagnosticKind::SessionAbsent);
    system.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_collections_are_separate() {
    let system = AppSystem::default();
    system.session.sign_in("alice");

    system
        .documents
        .create_one(&Reminder::new("r1", "alice", "Call back", 1_700_000_000))
        .await;
    system.notes.add(&Note::new("n1", "alice", "Note", "")).await;

    let reminders: Vec<Reminder> = system.documents.fetch_owned(None).await;
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].message, "Call back");
    assert!(!reminders[0].done);
    assert_eq!(system.notes.my_notes().await.len(), 1);

    let stats = system.documents.store().stats().await.unwrap();
    assert_eq!(stats.collections, 2);
    assert_eq!(stats.documents, 2);

    system.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_missing_note_is_reported() {
    let system = AppSystem::default();
    let mut feed = system.documents.diagnostics();

    assert!(system.notes.note("nope").await.is_none());
    let diagnostic = feed.recv().await.unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::NotFound);
    assert_eq!(diagnostic.collection, "notes");
    assert_eq!(diagnostic.subject.as_deref(), Some("nope"));

    system.shutdown().await.expect("clean shutdown");
}
