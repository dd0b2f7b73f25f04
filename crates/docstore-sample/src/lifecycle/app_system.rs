use crate::clients::NoteClient;
use crate::error::AppError;
use docstore_framework::{
    DiagnosticSink, DocumentClient, MemoryStoreActor, SessionState, StoreClient, StoreConfig,
};
use tracing::info;

/// The typed client every part of the app shares.
pub type AppClient = DocumentClient<StoreClient, SessionState>;

/// Owns the running store and the clients wired to it.
///
/// # Example
///
/// ```ignore
/// let system = AppSystem::new(&StoreConfig::from_env());
/// system.session.sign_in("user_1");
///
/// system.notes.add(&Note::new("n1", "user_1", "Groceries", "milk")).await;
/// let mine = system.notes.my_notes().await;
///
/// system.shutdown().await?;
/// ```
pub struct AppSystem {
    /// Who is signed in. Shared with every client.
    pub session: SessionState,

    /// Generic typed client, for record types without a dedicated client.
    pub documents: AppClient,

    pub notes: NoteClient,

    handle: tokio::task::JoinHandle<()>,
}

impl AppSystem {
    /// Spawns the store and wires the clients. Must be called inside a Tokio runtime.
    pub fn new(config: &StoreConfig) -> Self {
        let (actor, store) = MemoryStoreActor::new(config);
        let handle = tokio::spawn(actor.run());

        let session = SessionState::new();
        let diagnostics = DiagnosticSink::new(config.diagnostics_capacity);
        let documents = DocumentClient::with_diagnostics(store, session.clone(), diagnostics);
        let notes = NoteClient::new(documents.clone());

        info!(
            channel_capacity = config.channel_capacity.get(),
            diagnostics_capacity = config.diagnostics_capacity.get(),
            "App system started"
        );

        Self {
            session,
            documents,
            notes,
            handle,
        }
    }

    /// Drops the clients, which closes the store channel, then waits for the store to stop.
    pub async fn shutdown(self) -> Result<(), AppError> {
        info!("Shutting down app system");
        drop(self.documents);
        drop(self.notes);

        self.handle.await?;
        info!("App system shut down");
        Ok(())
    }
}

impl Default for AppSystem {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}
