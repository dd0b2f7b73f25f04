//! # Notes App Library
//!
//! A small notes application built on [`docstore_framework`]. This library exposes its modules
//! for the binary and for integration testing.
//!
//! - **[model]**: [`Note`](model::Note) and [`Reminder`](model::Reminder), the stored records
//! - **[clients]**: [`NoteClient`](clients::NoteClient), note-specific operations
//! - **[lifecycle]**: [`AppSystem`](lifecycle::AppSystem), which starts and stops the store

pub mod clients;
pub mod error;
pub mod lifecycle;
pub mod model;
