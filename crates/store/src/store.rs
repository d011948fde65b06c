//! The `DocumentStore` trait and query filters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::StoreError;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Equality filter applied to a top-level document field.
///
/// The store's query surface is deliberately small: engines only ever filter
/// on literal field values (enabled flags, trigger keys, collection scopes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Field name in the document payload.
    pub field: String,

    /// Value the field must equal.
    pub value: serde_json::Value,
}

impl QueryFilter {
    /// Build an equality filter.
    pub fn eq(field: &str, value: serde_json::Value) -> Self {
        Self {
            field: field.to_string(),
            value,
        }
    }
}

/// Abstract document store.
///
/// Every engine entry point receives an explicit handle to an implementation
/// of this trait; the engines themselves hold no persistence state. Each
/// individual `create`/`update` call is atomic, but the store offers no
/// cross-document transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by collection and id.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document>;

    /// Query a collection with equality filters (all must match).
    async fn query(&self, collection: &str, filters: &[QueryFilter]) -> StoreResult<Vec<Document>>;

    /// Create a new document with a server-assigned id and timestamps.
    ///
    /// Returns the stored document.
    async fn create(&self, collection: &str, data: serde_json::Value) -> StoreResult<Document>;

    /// Merge `partial` into an existing document's payload and bump its
    /// update timestamp. Top-level keys from `partial` overwrite existing
    /// same-named keys.
    ///
    /// Returns the document after the write.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: serde_json::Value,
    ) -> StoreResult<Document>;

    /// Check whether the backing storage is reachable.
    ///
    /// Stores with no external backend are always healthy.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Check whether a document matches all filters.
pub(crate) fn matches_filters(doc: &Document, filters: &[QueryFilter]) -> bool {
    filters
        .iter()
        .all(|f| doc.field(&f.field) == Some(&f.value))
}

/// Shallow-merge `partial` into `data`, overwriting same-named keys.
pub(crate) fn merge_into(data: &mut serde_json::Value, partial: &serde_json::Value) {
    if let (Some(target), Some(source)) = (data.as_object_mut(), partial.as_object()) {
        for (k, v) in source {
            target.insert(k.clone(), v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_matches_filters() {
        let doc = Document {
            id: "1".to_string(),
            collection: "dues".to_string(),
            data: serde_json::json!({"type": "income", "amount": 150}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let filters = vec![QueryFilter::eq("type", serde_json::json!("income"))];
        assert!(matches_filters(&doc, &filters));

        let filters = vec![
            QueryFilter::eq("type", serde_json::json!("income")),
            QueryFilter::eq("amount", serde_json::json!(100)),
        ];
        assert!(!matches_filters(&doc, &filters));

        assert!(matches_filters(&doc, &[]));
    }

    #[test]
    fn test_merge_into_overwrites() {
        let mut data = serde_json::json!({"a": 1, "b": 2});
        merge_into(&mut data, &serde_json::json!({"b": 3, "c": 4}));
        assert_eq!(data, serde_json::json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_into_non_object_is_noop() {
        let mut data = serde_json::json!({"a": 1});
        merge_into(&mut data, &serde_json::json!("not an object"));
        assert_eq!(data, serde_json::json!({"a": 1}));
    }
}
