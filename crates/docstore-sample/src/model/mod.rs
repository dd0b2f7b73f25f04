//! Record types stored through [`DocumentClient`](docstore_framework::DocumentClient).

pub mod note;
pub mod reminder;

pub use note::*;
pub use reminder::*;
