use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::document::nav::{self, NavItem};
use crate::document::validate::{validate_new_document, validate_order, validate_title};
use crate::document::{Document, NewDocument};
use crate::draft::{DraftPolicy, PendingChange};
use crate::error::{ContentError, ContentResult};
use crate::events::types::{DocumentEvent, DraftEvent};
use crate::events::{EventBus, SiteEvent};
use crate::media::{BlobStore, MediaAsset, MediaWithUrl, NewMedia, UploadTicket};
use crate::mutation::{DocumentPatch, OrderUpdate, PublishOutcome};
use crate::search::{self, SearchHit};
use crate::seed::SeedDocument;
use crate::settings::{LogoMode, Setting};
use crate::store::ContentStore;

/// Counts reported by [`ContentService::seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Every content operation, over a store, a blob store and the event bus.
/// Cloning is cheap.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    blobs: Arc<dyn BlobStore>,
    events: EventBus,
    drafts: DraftPolicy,
}

impl ContentService {
    pub fn new(
        store: Arc<dyn ContentStore>,
        blobs: Arc<dyn BlobStore>,
        events: EventBus,
        drafts: DraftPolicy,
    ) -> Self {
        Self {
            store,
            blobs,
            events,
            drafts,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    pub fn draft_policy(&self) -> DraftPolicy {
        self.drafts
    }

    pub async fn ping(&self) -> ContentResult<()> {
        self.store.ping().await
    }

    // Documents

    /// Documents in navigation order; hidden ones only when asked for.
    pub async fn list_documents(&self, include_hidden: bool) -> ContentResult<Vec<Document>> {
        let mut docs = self.store.list_documents().await?;
        if !include_hidden {
            docs.retain(|d| !d.hidden);
        }
        Ok(docs)
    }

    pub async fn get_document(&self, id: Uuid) -> ContentResult<Option<Document>> {
        self.store.get_document(id).await
    }

    pub async fn get_document_by_slug(&self, slug: &str) -> ContentResult<Option<Document>> {
        self.store.get_document_by_slug(slug).await
    }

    pub async fn navigation(&self) -> ContentResult<Vec<NavItem>> {
        let docs = self.store.list_documents().await?;
        Ok(nav::navigation(&docs))
    }

    pub async fn create_document(
        &self,
        mut new: NewDocument,
        actor: Option<&str>,
    ) -> ContentResult<Document> {
        new.slug = new.slug.trim().to_string();
        new.title = new.title.trim().to_string();
        validate_new_document(&new)?;

        let doc = self.store.create_document(new, actor, Utc::now()).await?;
        tracing::info!(document_id = %doc.id, slug = %doc.slug, order = doc.order, "document created");
        self.events
            .publish(SiteEvent::DocumentCreated(document_event(&doc, actor)));
        Ok(doc)
    }

    /// Write `patch` into the canonical document.
    ///
    /// Every pending draft for the document is discarded, the publisher's and
    /// everyone else's. Affected editors are told through `DraftsDiscarded`.
    pub async fn publish(
        &self,
        id: Uuid,
        mut patch: DocumentPatch,
        actor: Option<&str>,
    ) -> ContentResult<PublishOutcome> {
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
            validate_title(title)?;
        }
        if let Some(order) = patch.order {
            validate_order(order)?;
        }
        let now = Utc::now();
        let outcome = self.store.publish_document(id, &patch, actor, now).await?;

        tracing::info!(
            document_id = %id,
            discarded = outcome.discarded_drafts.len(),
            "document published"
        );
        self.events.publish(SiteEvent::DocumentPublished(document_event(
            &outcome.document,
            actor,
        )));

        let others: Vec<String> = outcome
            .discarded_drafts
            .iter()
            .filter(|user| Some(user.as_str()) != actor)
            .cloned()
            .collect();
        if !others.is_empty() {
            tracing::warn!(document_id = %id, users = ?others, "publish discarded other editors' drafts");
            self.events.publish(SiteEvent::DraftsDiscarded {
                document_id: id,
                user_ids: others,
                timestamp: now,
            });
        }
        Ok(outcome)
    }

    /// Delete a document together with all of its drafts.
    pub async fn delete_document(&self, id: Uuid) -> ContentResult<Document> {
        let doc = self.store.delete_document(id).await?;
        tracing::info!(document_id = %id, slug = %doc.slug, "document deleted");
        self.events
            .publish(SiteEvent::DocumentDeleted(document_event(&doc, None)));
        Ok(doc)
    }

    /// Apply a reorder batch. Re-sending the same batch is harmless.
    pub async fn reorder(&self, updates: &[OrderUpdate]) -> ContentResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        for update in updates {
            validate_order(update.order)?;
        }
        if let Err(err) = self.store.apply_orders(updates).await {
            tracing::warn!(error = %err, batch = updates.len(), "reorder batch failed");
            return Err(err);
        }
        tracing::info!(batch = updates.len(), "documents reordered");
        self.events.publish(SiteEvent::DocumentsReordered {
            document_ids: updates.iter().map(|u| u.id).collect(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    pub async fn search(&self, query: &str) -> ContentResult<Vec<SearchHit>> {
        let docs = self.store.list_documents().await?;
        Ok(search::search(&docs, query))
    }

    // Drafts

    pub async fn upsert_draft(
        &self,
        document_id: Uuid,
        user_id: &str,
        content: &str,
    ) -> ContentResult<PendingChange> {
        let now = Utc::now();
        let draft = self
            .store
            .upsert_draft(document_id, user_id, content, now)
            .await?;
        tracing::debug!(document_id = %document_id, user_id, "draft synced");
        self.events.publish(SiteEvent::DraftUpdated(DraftEvent {
            document_id,
            user_id: user_id.to_string(),
            timestamp: now,
        }));
        Ok(draft)
    }

    /// Live drafts for a document. Expired ones are left for the sweeper.
    pub async fn list_drafts(&self, document_id: Uuid) -> ContentResult<Vec<PendingChange>> {
        let now = Utc::now();
        let mut drafts = self.store.list_drafts(document_id).await?;
        drafts.retain(|d| self.drafts.is_live(d, now));
        Ok(drafts)
    }

    pub async fn clear_draft(&self, document_id: Uuid, user_id: &str) -> ContentResult<bool> {
        let removed = self.store.clear_draft(document_id, user_id).await?;
        if removed {
            self.events.publish(SiteEvent::DraftCleared(DraftEvent {
                document_id,
                user_id: user_id.to_string(),
                timestamp: Utc::now(),
            }));
        }
        Ok(removed)
    }

    /// Delete drafts idle past the policy's TTL as of `now`.
    pub async fn sweep_expired_drafts(&self, now: DateTime<Utc>) -> ContentResult<u64> {
        let purged = self
            .store
            .purge_drafts_before(self.drafts.cutoff(now))
            .await?;
        if purged > 0 {
            tracing::info!(purged, "expired drafts swept");
        }
        Ok(purged)
    }

    // Settings

    pub async fn get_setting(&self, key: &str) -> ContentResult<Option<Setting>> {
        self.store.get_setting(key).await
    }

    pub async fn list_settings(&self) -> ContentResult<Vec<Setting>> {
        self.store.list_settings().await
    }

    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> ContentResult<Setting> {
        self.store.set_setting(key, value, actor, Utc::now()).await
    }

    pub async fn save_logo(
        &self,
        mode: LogoMode,
        storage_id: &str,
        actor: Option<&str>,
    ) -> ContentResult<Setting> {
        self.set_setting(mode.setting_key(), storage_id, actor).await
    }

    pub async fn logo_url(&self, mode: LogoMode) -> ContentResult<Option<String>> {
        let setting = self.store.get_setting(mode.setting_key()).await?;
        Ok(setting.map(|s| self.blobs.url_for(&s.value)))
    }

    // Media

    pub fn issue_upload(&self) -> UploadTicket {
        self.blobs.issue_upload()
    }

    pub async fn save_media(&self, new: NewMedia) -> ContentResult<MediaAsset> {
        let asset = self.store.insert_media(new, Utc::now()).await?;
        tracing::info!(media_id = %asset.id, filename = %asset.filename, "media saved");
        Ok(asset)
    }

    pub async fn list_media(&self) -> ContentResult<Vec<MediaWithUrl>> {
        let media = self.store.list_media().await?;
        Ok(media.into_iter().map(|asset| self.with_url(asset)).collect())
    }

    pub async fn get_media(&self, id: Uuid) -> ContentResult<Option<MediaWithUrl>> {
        let asset = self.store.get_media(id).await?;
        Ok(asset.map(|asset| self.with_url(asset)))
    }

    /// Delete the blob, then the metadata row.
    pub async fn remove_media(&self, id: Uuid) -> ContentResult<MediaAsset> {
        let asset = self
            .store
            .get_media(id)
            .await?
            .ok_or_else(|| ContentError::not_found("media", id))?;
        if !self.blobs.delete(&asset.storage_id).await? {
            tracing::warn!(media_id = %id, storage_id = %asset.storage_id, "media blob already gone");
        }
        self.store
            .delete_media(id)
            .await?
            .ok_or_else(|| ContentError::not_found("media", id))
    }

    fn with_url(&self, asset: MediaAsset) -> MediaWithUrl {
        MediaWithUrl {
            url: self.blobs.url_for(&asset.storage_id),
            asset,
        }
    }

    // Seeding

    /// Insert seed documents whose slug is not taken yet. Files that do not
    /// make a valid document are skipped with a warning.
    pub async fn seed(&self, docs: Vec<SeedDocument>) -> ContentResult<SeedReport> {
        let mut report = SeedReport::default();
        for doc in docs {
            if self.store.get_document_by_slug(&doc.slug).await?.is_some() {
                report.skipped += 1;
                continue;
            }
            let slug = doc.slug.clone();
            match self.create_document(doc.into_new_document(), None).await {
                Ok(_) => report.created += 1,
                Err(ContentError::Validation(err)) => {
                    tracing::warn!(slug = %slug, error = %err, "seed file skipped");
                    report.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(created = report.created, skipped = report.skipped, "seed complete");
        Ok(report)
    }
}

fn document_event(doc: &Document, actor: Option<&str>) -> DocumentEvent {
    DocumentEvent {
        document_id: doc.id,
        slug: doc.slug.clone(),
        actor: actor.map(str::to_string),
        timestamp: doc.updated_at,
    }
}
