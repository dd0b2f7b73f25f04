//! # Documents, Queries and Snapshots
//!
//! Plain values exchanged with a [`DocumentStore`](crate::DocumentStore). A document body is a
//! JSON object; a query names one collection and at most one equality filter.

use serde_json::{Map, Value};

/// The body of a stored document.
pub type DocumentData = Map<String, Value>;

/// A document as returned by the store: its key plus its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub data: DocumentData,
}

impl Document {
    pub fn new(key: impl Into<String>, data: DocumentData) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

/// Equality filter on a single body field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

/// A read against one collection, optionally narrowed by a [`FieldFilter`].
///
/// ```rust
/// use docstore_framework::Query;
///
/// let all = Query::collection("notes");
/// let mine = Query::collection("notes").where_eq("ownerId", "user_1");
/// assert!(all.filter.is_none());
/// assert_eq!(mine.filter.unwrap().field, "ownerId");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Option<FieldFilter>,
}

impl Query {
    /// Every document in `collection`.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: None,
        }
    }

    /// Narrow the query to documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Whether a document body satisfies this query's filter.
    pub fn matches(&self, data: &DocumentData) -> bool {
        match &self.filter {
            Some(filter) => data.get(&filter.field) == Some(&filter.value),
            None => true,
        }
    }
}

/// The full result set of a query at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySnapshot {
    pub documents: Vec<Document>,
}

impl QuerySnapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_unfiltered_query_matches_everything() {
        let query = Query::collection("notes");
        assert!(query.matches(&body(json!({ "title": "a" }))));
        assert!(query.matches(&DocumentData::new()));
    }

    #[test]
    fn test_equality_filter() {
        let query = Query::collection("notes").where_eq("ownerId", "user_1");
        assert!(query.matches(&body(json!({ "ownerId": "user_1" }))));
        assert!(!query.matches(&body(json!({ "ownerId": "user_2" }))));
        assert!(!query.matches(&body(json!({ "title": "no owner" }))));
    }
}
