//! Document envelope for stored records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored document with server-assigned identity and timestamps.
///
/// The `data` payload is an opaque JSON object; the store never assumes a
/// schema beyond what individual callers read from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier, unique within its collection.
    pub id: String,

    /// Collection the document belongs to.
    pub collection: String,

    /// Document payload.
    pub data: serde_json::Value,

    /// Creation timestamp (server-assigned).
    pub created_at: DateTime<Utc>,

    /// Last update timestamp (server-assigned).
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Look up a top-level field in the document payload.
    ///
    /// Returns `None` for missing fields and for non-object payloads.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.as_object().and_then(|obj| obj.get(name))
    }

    /// Deserialize the payload into a typed value.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_doc(data: serde_json::Value) -> Document {
        Document {
            id: "d-1".to_string(),
            collection: "members".to_string(),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_field_lookup() {
        let doc = make_doc(serde_json::json!({"name": "Ada", "active": true}));
        assert_eq!(doc.field("name"), Some(&serde_json::json!("Ada")));
        assert_eq!(doc.field("active"), Some(&serde_json::json!(true)));
        assert!(doc.field("missing").is_none());
    }

    #[test]
    fn test_field_on_non_object() {
        let doc = make_doc(serde_json::json!([1, 2, 3]));
        assert!(doc.field("anything").is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let doc = make_doc(serde_json::json!({"amount": 150}));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("members"));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "d-1");
    }
}
