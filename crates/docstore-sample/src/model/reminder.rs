use docstore_framework::DocumentRecord;
use serde::{Deserialize, Serialize};

/// A timed reminder, stored in the `reminders` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub message: String,
    /// Unix timestamp, seconds.
    pub due_at: i64,
    #[serde(default)]
    pub done: bool,
    #[serde(skip)]
    pub document_key: Option<String>,
}

impl Reminder {
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        message: impl Into<String>,
        due_at: i64,
    ) -> Self {
        Self {
            id: Some(id.into()),
            owner_id: Some(owner_id.into()),
            message: message.into(),
            due_at,
            done: false,
            document_key: None,
        }
    }
}

impl DocumentRecord for Reminder {
    const COLLECTION: &'static str = "reminders";

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
