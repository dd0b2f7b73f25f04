//! # Note Client
//!
//! Provides a note-specific API over a [`DocumentClient`].
//! It wraps the generic typed operations and adds the few note queries the app needs.
use crate::model::Note;
use docstore_framework::{DocumentClient, SessionState, Snapshots, StoreClient};
use tracing::{debug, instrument};

/// Client for reading and writing the signed-in user's notes.
#[derive(Clone)]
pub struct NoteClient {
    inner: DocumentClient<StoreClient, SessionState>,
}

impl NoteClient {
    pub fn new(inner: DocumentClient<StoreClient, SessionState>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &DocumentClient<StoreClient, SessionState> {
        &self.inner
    }

    /// Notes owned by the signed-in user. Empty when nobody is signed in.
    pub async fn my_notes(&self) -> Vec<Note> {
        self.inner.fetch_owned(None).await
    }

    pub async fn notes_of(&self, owner_id: &str) -> Vec<Note> {
        self.inner.fetch_owned(Some(owner_id)).await
    }

    /// The note stored under `key`.
    pub async fn note(&self, key: &str) -> Option<Note> {
        self.inner.fetch_one(key).await
    }

    /// Pinned notes of the signed-in user, sorted by title.
    #[instrument(skip(self))]
    pub async fn pinned(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .my_notes()
            .await
            .into_iter()
            .filter(|note| note.pinned)
            .collect();
        notes.sort_by(|a, b| a.title.cmp(&b.title));
        debug!(count = notes.len(), "Pinned notes");
        notes
    }

    pub async fn add(&self, note: &Note) {
        self.inner.create_one(note).await
    }

    pub async fn add_all(&self, notes: &[Note]) {
        self.inner.create_many(notes).await
    }

    /// Replaces the stored note. `note` must have been fetched, so it carries its document key.
    pub async fn save(&self, note: &Note) {
        self.inner.upsert(note).await
    }

    /// Pins or unpins the note under `key`. Returns `false` when it could not be read.
    #[instrument(skip(self))]
    pub async fn set_pinned(&self, key: &str, pinned: bool) -> bool {
        let Some(mut note) = self.note(key).await else {
            return false;
        };
        note.pinned = pinned;
        self.save(&note).await;
        true
    }

    /// Deletes the given notes, matched by their domain id.
    pub async fn remove(&self, notes: &[Note]) {
        self.inner.delete_many(notes).await
    }

    /// Live view of the signed-in user's notes.
    pub async fn watch_my_notes(&self) -> Snapshots<Note> {
        self.inner.observe_owned().await
    }
}
