//! Document change events and the subscription feed.
//!
//! The rule engine reacts to writes through a subscription interface rather
//! than by knowing how change notification is delivered. `WatchedStore`
//! decorates any `DocumentStore` and publishes a `ChangeEvent` after every
//! successful write; subscribers receive events over a broadcast channel.
//!
//! Delivery is at-least-once from the subscriber's point of view: consumers
//! must tolerate seeing the same logical change more than once. No
//! deduplication happens here.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::document::Document;
use crate::store::{DocumentStore, QueryFilter, StoreResult};

/// Default capacity of the in-process change channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Kind of write that produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A new document was created.
    Created,
    /// An existing document was updated.
    Updated,
}

/// A document change, delivered after the write committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Collection that was written to.
    pub collection: String,

    /// Identifier of the written document.
    pub document_id: String,

    /// Kind of write.
    pub kind: ChangeKind,

    /// Document payload after the write.
    pub document: serde_json::Value,
}

/// Source of change events.
///
/// Implementations may deliver from an in-process channel, a message bus, or
/// a polled log; subscribers only see the receiver.
pub trait ChangeSource: Send + Sync {
    /// Subscribe to all future change events.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// In-process change feed backed by a broadcast channel.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed with the default capacity.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { sender }
    }

    /// Publish a change event to all current subscribers.
    ///
    /// Events published with no subscriber are dropped; the feed does not
    /// buffer for subscribers that have not attached yet.
    pub fn publish(&self, event: ChangeEvent) {
        let receivers = self.sender.receiver_count();
        if self.sender.send(event).is_err() {
            tracing::trace!("Change event dropped, no subscribers");
        } else {
            tracing::trace!(receivers, "Change event published");
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSource for ChangeFeed {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

/// Store decorator that publishes a change event after every write.
///
/// Reads pass straight through. The event carries the post-write document
/// state, so subscribers never need to re-fetch.
pub struct WatchedStore {
    inner: Arc<dyn DocumentStore>,
    feed: ChangeFeed,
}

impl WatchedStore {
    /// Wrap a store, publishing changes to `feed`.
    pub fn new(inner: Arc<dyn DocumentStore>, feed: ChangeFeed) -> Self {
        Self { inner, feed }
    }

    /// The feed this store publishes to.
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn emit(&self, doc: &Document, kind: ChangeKind) {
        self.feed.publish(ChangeEvent {
            collection: doc.collection.clone(),
            document_id: doc.id.clone(),
            kind,
            document: doc.data.clone(),
        });
    }
}

#[async_trait]
impl DocumentStore for WatchedStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        self.inner.get(collection, id).await
    }

    async fn query(&self, collection: &str, filters: &[QueryFilter]) -> StoreResult<Vec<Document>> {
        self.inner.query(collection, filters).await
    }

    async fn create(&self, collection: &str, data: serde_json::Value) -> StoreResult<Document> {
        let doc = self.inner.create(collection, data).await?;
        self.emit(&doc, ChangeKind::Created);
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: serde_json::Value,
    ) -> StoreResult<Document> {
        let doc = self.inner.update(collection, id, partial).await?;
        self.emit(&doc, ChangeKind::Updated);
        Ok(doc)
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}
