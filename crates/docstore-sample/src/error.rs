//! Error types for the sample application.

use thiserror::Error;

/// Errors raised while running the application itself. Data access never fails loudly; see
/// [`DocumentClient`](docstore_framework::DocumentClient).
#[derive(Debug, Error)]
pub enum AppError {
    /// The store task panicked or was cancelled.
    #[error("Store task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
