use docstore_framework::DocumentRecord;
use serde::{Deserialize, Serialize};

/// A user's note.
///
/// # Document Store
/// This struct implements [`DocumentRecord`], so it can be read and written through a
/// [`DocumentClient`](docstore_framework::DocumentClient). It lives in the `notes` collection.
///
/// `document_key` is assigned by the store and never written into the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(skip)]
    pub document_key: Option<String>,
}

impl Note {
    /// Creates a new, unpinned Note.
    ///
    /// # Arguments
    /// * `id` - Domain identifier chosen by the caller
    /// * `owner_id` - The owning user's id
    /// * `title` - Note title
    /// * `body` - Note text
    ///
    /// # Notes
    /// The document key stays empty until the note has been stored and fetched back.
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            owner_id: Some(owner_id.into()),
            title: title.into(),
            body: body.into(),
            pinned: false,
            document_key: None,
        }
    }
}

impl DocumentRecord for Note {
    const COLLECTION: &'static str = "notes";

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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_body_uses_camel_case_and_omits_key() {
        let mut note = Note::new("n1", "user_1", "Groceries", "milk");
        note.document_key = Some("k1".to_string());

        let body = serde_json::to_value(&note).unwrap();
        assert_eq!(
            body,
            json!({
                "id": "n1",
                "ownerId": "user_1",
                "title": "Groceries",
                "body": "milk",
                "pinned": false
            })
        );
    }

    #[test]
    fn test_pinned_defaults_to_false() {
        let note: Note = serde_json::from_value(json!({
            "id": "n1",
            "ownerId": "user_1",
            "title": "t",
            "body": "b"
        }))
        .unwrap();
        assert!(!note.pinned);
        assert!(note.document_key.is_none());
    }
}
