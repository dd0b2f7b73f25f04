use docstore_framework::tracing::setup_test_tracing;
use docstore_framework::{
    DiagnosticKind, DocumentClient, DocumentRecord, DocumentStore, MemoryStoreActor,
    SessionProvider, SessionState, StoreClient, StoreConfig,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// --- Test Record ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Card {
    id: Option<String>,
    owner_id: Option<String>,
    front: String,
    back: String,
    #[serde(skip)]
    document_key: Option<String>,
}

impl DocumentRecord for Card {
    const COLLECTION: &'static str = "cards";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
    fn document_key(&self) -> Option<&str> {
        self.document_key.as_deref()
    }
    fn set_document_key(&mut self, key: String) {
        self.document_key = Some(key);
    }
}

fn card(id: &str, owner: &str) -> Card {
    Card {
        id: Some(id.to_string()),
        owner_id: Some(owner.to_string()),
        front: format!("front {id}"),
        back: format!("back {id}"),
        document_key: None,
    }
}

fn without_key(mut card: Card) -> Card {
    card.document_key = None;
    card
}

fn ids(cards: &[Card]) -> Vec<String> {
    let mut ids: Vec<String> = cards.iter().filter_map(|c| c.id.clone()).collect();
    ids.sort();
    ids
}

fn start_store() -> StoreClient {
    setup_test_tracing();
    let counter = Arc::new(AtomicU64::new(1));
    let (actor, store) = MemoryStoreActor::with_key_generator(&StoreConfig::default(), move || {
        format!("doc_{}", counter.fetch_add(1, Ordering::SeqCst))
    });
    tokio::spawn(actor.run());
    store
}

// --- Tests ---

#[tokio::test]
async fn test_fetch_owned_filters_by_owner() {
    let store = start_store();
    let session = SessionState::signed_in("alice");
    let client = DocumentClient::new(store, session);

    client
        .create_many(&[card("a1", "alice"), card("b1", "bob"), card("a2", "alice")])
        .await;

    let mine: Vec<Card> = client.fetch_owned(None).await;
    assert_eq!(ids(&mine), vec!["a1", "a2"]);
    assert!(mine.iter().all(|c| c.owner_id.as_deref() == Some("alice")));

    let bobs: Vec<Card> = client.fetch_owned(Some("bob")).await;
    assert_eq!(ids(&bobs), vec!["b1"]);
}

#[tokio::test]
async fn test_fetch_owned_follows_session_changes() {
    let store = start_store();
    let client = DocumentClient::new(store, SessionState::new());
    client
        .create_many(&[card("a1", "alice"), card("b1", "bob")])
        .await;

    client.session().sign_in("bob");
    assert_eq!(client.session().current_user_id().as_deref(), Some("bob"));
    let cards: Vec<Card> = client.fetch_owned(None).await;
    assert_eq!(ids(&cards), vec!["b1"]);

    client.session().sign_out();
    let cards: Vec<Card> = client.fetch_owned(None).await;
    assert!(cards.is_empty());
}

#[tokio::test]
async fn test_fetch_owned_without_session_is_empty() {
    let store = start_store();
    let client = DocumentClient::new(store, SessionState::new());
    client.create_one(&card("a1", "alice")).await;

    let cards: Vec<Card> = client.fetch_owned(None).await;
    assert!(cards.is_empty());

    // An explicit owner still works without a session.
    let cards: Vec<Card> = client.fetch_owned(Some("alice")).await;
    assert_eq!(cards.len(), 1);
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let store = start_store();
    let client = DocumentClient::new(store, SessionState::new());
    let original = card("a1", "alice");

    client.create_one(&original).await;

    let all: Vec<Card> = client.fetch_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].document_key.as_deref(), Some("doc_1"));
    assert_eq!(without_key(all[0].clone()), original);

    let fetched: Card = client.fetch_one("doc_1").await.expect("card by key");
    assert_eq!(without_key(fetched), original);
}

#[tokio::test]
async fn test_fetch_all_skips_undecodable_documents() {
    let store = start_store();
    let client = DocumentClient::new(store.clone(), SessionState::new());
    let mut feed = client.diagnostics();

    client.create_one(&card("a1", "alice")).await;
    let corrupt = json!({ "id": "x", "front": 7 }).as_object().cloned().unwrap();
    let corrupt_key = store.add(Card::COLLECTION, corrupt).await.unwrap();

    let all: Vec<Card> = client.fetch_all().await;
    assert_eq!(ids(&all), vec!["a1"]);

    let diagnostic = feed.recv().await.unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::Decode);
    assert_eq!(diagnostic.subject, Some(corrupt_key));
}

#[tokio::test]
async fn test_fetch_one_missing_is_none() {
    let store = start_store();
    let client = DocumentClient::new(store, SessionState::new());
    let mut feed = client.diagnostics();

    assert!(client.fetch_one::<Card>("nope").await.is_none());
    assert_eq!(feed.recv().await.unwrap().kind, DiagnosticKind::NotFound);
}

#[tokio::test]
async fn test_upsert_replaces_whole_document() {
    let store = start_store();
    let client = DocumentClient::new(store.clone(), SessionState::new());
    client.create_one(&card("a1", "alice")).await;

    let mut stored: Card = client.fetch_one("doc_1").await.unwrap();
    stored.back = "updated".to_string();
    stored.owner_id = None;
    client.upsert(&stored).await;

    let raw = store.get(Card::COLLECTION, "doc_1").await.unwrap().unwrap();
    assert_eq!(raw.data.get("back"), Some(&json!("updated")));
    assert_eq!(raw.data.get("ownerId"), Some(&json!(null)));

    let reread: Card = client.fetch_one("doc_1").await.unwrap();
    assert_eq!(reread, stored);
}

#[tokio::test]
async fn test_upsert_without_key_leaves_store_unchanged() {
    let store = start_store();
    let client = DocumentClient::new(store.clone(), SessionState::new());
    client.create_one(&card("a1", "alice")).await;
    let before = store.get_all(Card::COLLECTION).await.unwrap();

    client.upsert(&card("a2", "alice")).await;

    let after = store.get_all(Card::COLLECTION).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_delete_many_by_domain_id() {
    let store = start_store();
    let client = DocumentClient::new(store.clone(), SessionState::new());
    client
        .create_many(&[card("a1", "alice"), card("a2", "alice"), card("a3", "alice")])
        .await;

    // Domain ids differ from document keys; deletion must locate documents by id.
    client.delete_many(&[card("a1", "alice"), card("a3", "alice")]).await;

    let left: Vec<Card> = client.fetch_all().await;
    assert_eq!(ids(&left), vec!["a2"]);
}

#[tokio::test]
async fn test_delete_many_unmatched_id_leaves_store_unchanged() {
    let store = start_store();
    let client = DocumentClient::new(store.clone(), SessionState::new());
    client.create_one(&card("a1", "alice")).await;
    let before = store.get_all(Card::COLLECTION).await.unwrap();

    let mut anonymous = card("zzz", "alice");
    anonymous.id = None;
    client.delete_many(&[card("ghost", "alice"), anonymous]).await;

    let after = store.get_all(Card::COLLECTION).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_observe_owned_pushes_full_snapshots() {
    let store = start_store();
    let session = SessionState::signed_in("alice");
    let client = DocumentClient::new(store, session);
    client.create_one(&card("a1", "alice")).await;

    let mut snapshots = client.observe_owned::<Card>().await;
    assert!(snapshots.is_live());

    // Initial state.
    assert_eq!(ids(&snapshots.next().await.unwrap()), vec!["a1"]);

    // Create.
    client.create_one(&card("a2", "alice")).await;
    assert_eq!(ids(&snapshots.next().await.unwrap()), vec!["a1", "a2"]);

    // Another owner's write does not change alice's set, so nothing is pushed for it;
    // the next snapshot reflects the following update.
    client.create_one(&card("b1", "bob")).await;
    let mut a1: Card = client.fetch_one("doc_1").await.unwrap();
    a1.front = "edited".to_string();
    client.upsert(&a1).await;
    let after_update = snapshots.next().await.unwrap();
    assert_eq!(ids(&after_update), vec!["a1", "a2"]);
    assert!(after_update.iter().any(|c| c.front == "edited"));
    assert!(after_update.iter().all(|c| c.owner_id.as_deref() == Some("alice")));

    // Delete.
    client.delete_many(&[card("a2", "alice")]).await;
    assert_eq!(ids(&snapshots.next().await.unwrap()), vec!["a1"]);
}

#[tokio::test]
async fn test_unpolled_snapshots_keep_only_the_newest_set() {
    let store = start_store();
    let client = DocumentClient::new(store, SessionState::signed_in("alice"));

    let mut snapshots = client.observe_owned::<Card>().await;

    // Three changes land before the stream is polled at all.
    client.create_one(&card("a1", "alice")).await;
    client.create_one(&card("a2", "alice")).await;
    client.create_one(&card("a3", "alice")).await;

    assert_eq!(ids(&snapshots.next().await.unwrap()), vec!["a1", "a2", "a3"]);
    let pending = tokio::time::timeout(Duration::from_millis(50), snapshots.next()).await;
    assert!(pending.is_err(), "intermediate snapshots were queued");
}

#[tokio::test]
async fn test_dropping_snapshots_unregisters_listener() {
    let store = start_store();
    let client = DocumentClient::new(store.clone(), SessionState::signed_in("alice"));

    let first = client.observe_owned::<Card>().await;
    let second = client.observe_owned::<Card>().await;
    assert_eq!(store.stats().await.unwrap().listeners, 2);

    drop(first);
    assert_eq!(store.stats().await.unwrap().listeners, 1);

    drop(second);
    assert_eq!(store.stats().await.unwrap().listeners, 0);
}

#[tokio::test]
async fn test_store_works_with_single_slot_channel() {
    setup_test_tracing();
    let one = NonZeroUsize::MIN;
    let config = StoreConfig::default()
        .with_channel_capacity(one)
        .with_diagnostics_capacity(one);
    let (actor, store) = MemoryStoreActor::new(&config);
    tokio::spawn(actor.run());
    let client = DocumentClient::new(store, SessionState::signed_in("alice"));

    client
        .create_many(&[card("a1", "alice"), card("a2", "alice"), card("a3", "alice")])
        .await;

    let cards: Vec<Card> = client.fetch_owned(None).await;
    assert_eq!(ids(&cards), vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn test_store_shutdown_degrades_silently() {
    setup_test_tracing();
    let (actor, store) = MemoryStoreActor::new(&StoreConfig::default());
    let handle = tokio::spawn(actor.run());
    let client = DocumentClient::new(store, SessionState::signed_in("alice"));
    let mut feed = client.diagnostics();

    handle.abort();
    let _ = handle.await;

    let cards: Vec<Card> = client.fetch_owned(None).await;
    assert!(cards.is_empty());
    client.create_one(&card("a1", "alice")).await;

    assert_eq!(feed.recv().await.unwrap().kind, DiagnosticKind::Store);
    assert_eq!(feed.recv().await.unwrap().kind, DiagnosticKind::Store);
}
