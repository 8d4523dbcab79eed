//! Persistence seam for documents, drafts, settings and media metadata.
//!
//! [`MemoryStore`] backs tests and database-less runs; [`PgStore`] is the
//! production store. Both sort documents by `(order, id)` and both apply
//! reorder batches atomically.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::document::{Document, NewDocument};
use crate::draft::PendingChange;
use crate::error::ContentResult;
use crate::media::{MediaAsset, NewMedia};
use crate::mutation::{DocumentPatch, OrderUpdate, PublishOutcome};
use crate::settings::Setting;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Connectivity check for health endpoints.
    async fn ping(&self) -> ContentResult<()>;

    // Documents

    /// Every document, hidden ones included, in navigation order.
    async fn list_documents(&self) -> ContentResult<Vec<Document>>;

    async fn get_document(&self, id: Uuid) -> ContentResult<Option<Document>>;

    async fn get_document_by_slug(&self, slug: &str) -> ContentResult<Option<Document>>;

    /// Insert a document. An absent `order` becomes `max(order) + 1`.
    /// Fails with `DuplicateSlug` when the slug is taken.
    async fn create_document(
        &self,
        new: NewDocument,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<Document>;

    /// Patch the canonical document and drop every draft for it.
    async fn publish_document(
        &self,
        id: Uuid,
        patch: &DocumentPatch,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<PublishOutcome>;

    /// Delete a document and its drafts. Returns the deleted row.
    async fn delete_document(&self, id: Uuid) -> ContentResult<Document>;

    /// Rewrite `order` for each listed document. Unknown ids fail the batch.
    async fn apply_orders(&self, updates: &[OrderUpdate]) -> ContentResult<()>;

    // Drafts

    /// Insert or replace the draft for `(document_id, user_id)`.
    async fn upsert_draft(
        &self,
        document_id: Uuid,
        user_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> ContentResult<PendingChange>;

    async fn list_drafts(&self, document_id: Uuid) -> ContentResult<Vec<PendingChange>>;

    /// Returns whether a draft existed.
    async fn clear_draft(&self, document_id: Uuid, user_id: &str) -> ContentResult<bool>;

    /// Delete drafts last touched before `cutoff`. Returns how many went.
    async fn purge_drafts_before(&self, cutoff: DateTime<Utc>) -> ContentResult<u64>;

    // Settings

    async fn get_setting(&self, key: &str) -> ContentResult<Option<Setting>>;

    async fn list_settings(&self) -> ContentResult<Vec<Setting>>;

    async fn set_setting(
        &self,
        key: &str,
        value: &str,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<Setting>;

    // Media

    async fn insert_media(&self, new: NewMedia, now: DateTime<Utc>) -> ContentResult<MediaAsset>;

    /// Newest first.
    async fn list_media(&self) -> ContentResult<Vec<MediaAsset>>;

    async fn get_media(&self, id: Uuid) -> ContentResult<Option<MediaAsset>>;

    async fn delete_media(&self, id: Uuid) -> ContentResult<Option<MediaAsset>>;
}
