//! # Application Lifecycle
//!
//! Starts the document store, wires the session and clients to it, and shuts it down again.
//!
//! ## Wiring
//!
//! [`AppSystem::new`] spawns one [`MemoryStoreActor`](docstore_framework::MemoryStoreActor)
//! and hands clones of its [`StoreClient`](docstore_framework::StoreClient) to every client.
//! All clients share one [`SessionState`](docstore_framework::SessionState), so signing in
//! through `system.session` changes what every owner-scoped call sees.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - closes the sender side of the store channel
//! 2. **Store detects closure** - `receiver.recv()` returns `None`
//! 3. **Store logs its final sizes** and its task ends
//! 4. **Await completion** - [`AppSystem::shutdown`] joins the task
//!
//! Clients cloned out of the system keep the store alive; drop them before calling
//! `shutdown`, or it will wait for them. Open `Snapshots` streams do not hold the store.

pub mod app_system;

pub use app_system::*;
