//! # DocumentRecord Trait
//!
//! The `DocumentRecord` trait is the contract every typed record (Note, Reminder, …) must
//! satisfy to be stored through the generic [`DocumentClient`](crate::DocumentClient). It names
//! the collection the type lives in and exposes the three identifiers the client works with.
//!
//! # Architecture Note
//! Each record type supplies a collection name plus accessors and keeps its own fields.
//! The client is written once against this contract.
//!
//! # Three identifiers
//! - **`id`**: the domain identifier, part of the document body (`"id"`).
//! - **`owner_id`**: the owning user, part of the document body (`"ownerId"`).
//! - **`document_key`**: the store-assigned key. It is *not* part of the body; implementors
//!   mark the field `#[serde(skip)]` and the client fills it in after a fetch.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Body field holding the domain identifier.
pub const ID_FIELD: &str = "id";

/// Body field holding the owning user's id.
pub const OWNER_FIELD: &str = "ownerId";

/// Trait that any typed record must implement to be managed by `DocumentClient`.
///
/// # Example
///
/// ```rust
/// use docstore_framework::DocumentRecord;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Note {
///     id: Option<String>,
///     owner_id: Option<String>,
///     title: String,
///     #[serde(skip)]
///     document_key: Option<String>,
/// }
///
/// impl DocumentRecord for Note {
///     const COLLECTION: &'static str = "notes";
///
///     fn id(&self) -> Option<&str> { self.id.as_deref() }
///     fn owner_id(&self) -> Option<&str> { self.owner_id.as_deref() }
///     fn document_key(&self) -> Option<&str> { self.document_key.as_deref() }
///     fn set_document_key(&mut self, key: String) { self.document_key = Some(key); }
/// }
///
/// assert_eq!(Note::COLLECTION, "notes");
/// ```
pub trait DocumentRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The collection ("endpoint") holding every document of this type.
    const COLLECTION: &'static str;

    /// The domain identifier, if the record has one.
    fn id(&self) -> Option<&str>;

    /// The owning user's id, if the record is owner-scoped.
    fn owner_id(&self) -> Option<&str>;

    /// The store-assigned document key, present on records that came from the store.
    fn document_key(&self) -> Option<&str>;

    /// Called by the client after decoding a fetched document.
    fn set_document_key(&mut self, key: String);
}

/// Short type name used in log lines (e.g. `Note` instead of `docstore_sample::model::note::Note`).
pub fn record_type<T>() -> &'static str {
    std::any::type_name::<T>()
        .split("::")
        .last()
        .unwrap_or("Unknown")
}
