pub mod note_client;

pub use note_client::*;
