use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ContentStore;
use crate::document::model::{next_order, sort_documents};
use crate::document::{Document, NewDocument};
use crate::draft::PendingChange;
use crate::error::{ContentError, ContentResult};
use crate::media::{MediaAsset, NewMedia};
use crate::mutation::{DocumentPatch, OrderUpdate, PublishOutcome};
use crate::settings::Setting;

/// Process-local store. Every operation holds one lock, so each is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<Uuid, Document>,
    drafts: HashMap<(Uuid, String), PendingChange>,
    settings: BTreeMap<String, Setting>,
    media: HashMap<Uuid, MediaAsset>,
}

impl Inner {
    fn remove_drafts_for(&mut self, document_id: Uuid) -> Vec<String> {
        let mut removed = Vec::new();
        self.drafts.retain(|(doc, user), _| {
            if *doc == document_id {
                removed.push(user.clone());
                false
            } else {
                true
            }
        });
        removed.sort();
        removed
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn ping(&self) -> ContentResult<()> {
        Ok(())
    }

    async fn list_documents(&self) -> ContentResult<Vec<Document>> {
        let inner = self.inner.read().await;
        let mut docs: Vec<Document> = inner.documents.values().cloned().collect();
        sort_documents(&mut docs);
        Ok(docs)
    }

    async fn get_document(&self, id: Uuid) -> ContentResult<Option<Document>> {
        Ok(self.inner.read().await.documents.get(&id).cloned())
    }

    async fn get_document_by_slug(&self, slug: &str) -> ContentResult<Option<Document>> {
        let inner = self.inner.read().await;
        Ok(inner.documents.values().find(|d| d.slug == slug).cloned())
    }

    async fn create_document(
        &self,
        new: NewDocument,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<Document> {
        let mut inner = self.inner.write().await;
        if inner.documents.values().any(|d| d.slug == new.slug) {
            return Err(ContentError::DuplicateSlug(new.slug));
        }
        let order = new
            .order
            .unwrap_or_else(|| next_order(inner.documents.values().map(|d| d.order)));
        let doc = new.into_document(Uuid::now_v7(), order, now, actor);
        inner.documents.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn publish_document(
        &self,
        id: Uuid,
        patch: &DocumentPatch,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<PublishOutcome> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .documents
            .get_mut(&id)
            .ok_or_else(|| ContentError::not_found("document", id))?;
        patch.apply_to(doc);
        doc.updated_at = now;
        doc.updated_by = actor.map(str::to_string);
        let document = doc.clone();
        let discarded_drafts = inner.remove_drafts_for(id);
        Ok(PublishOutcome {
            document,
            discarded_drafts,
        })
    }

    async fn delete_document(&self, id: Uuid) -> ContentResult<Document> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .documents
            .remove(&id)
            .ok_or_else(|| ContentError::not_found("document", id))?;
        inner.remove_drafts_for(id);
        Ok(doc)
    }

    async fn apply_orders(&self, updates: &[OrderUpdate]) -> ContentResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(missing) = updates.iter().find(|u| !inner.documents.contains_key(&u.id)) {
            return Err(ContentError::not_found("document", missing.id));
        }
        for update in updates {
            if let Some(doc) = inner.documents.get_mut(&update.id) {
                doc.order = update.order;
            }
        }
        Ok(())
    }

    async fn upsert_draft(
        &self,
        document_id: Uuid,
        user_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> ContentResult<PendingChange> {
        let mut inner = self.inner.write().await;
        if !inner.documents.contains_key(&document_id) {
            return Err(ContentError::not_found("document", document_id));
        }
        let draft = inner
            .drafts
            .entry((document_id, user_id.to_string()))
            .and_modify(|draft| {
                draft.content = content.to_string();
                draft.last_updated = now;
            })
            .or_insert_with(|| PendingChange {
                id: Uuid::now_v7(),
                document_id,
                user_id: user_id.to_string(),
                content: content.to_string(),
                last_updated: now,
            });
        Ok(draft.clone())
    }

    async fn list_drafts(&self, document_id: Uuid) -> ContentResult<Vec<PendingChange>> {
        let inner = self.inner.read().await;
        let mut drafts: Vec<PendingChange> = inner
            .drafts
            .values()
            .filter(|d| d.document_id == document_id)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(drafts)
    }

    async fn clear_draft(&self, document_id: Uuid, user_id: &str) -> ContentResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .drafts
            .remove(&(document_id, user_id.to_string()))
            .is_some())
    }

    async fn purge_drafts_before(&self, cutoff: DateTime<Utc>) -> ContentResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.drafts.len();
        inner.drafts.retain(|_, d| d.last_updated >= cutoff);
        Ok((before - inner.drafts.len()) as u64)
    }

    async fn get_setting(&self, key: &str) -> ContentResult<Option<Setting>> {
        Ok(self.inner.read().await.settings.get(key).cloned())
    }

    async fn list_settings(&self) -> ContentResult<Vec<Setting>> {
        Ok(self.inner.read().await.settings.values().cloned().collect())
    }

    async fn set_setting(
        &self,
        key: &str,
        value: &str,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<Setting> {
        let mut inner = self.inner.write().await;
        let setting = inner
            .settings
            .entry(key.to_string())
            .and_modify(|s| {
                s.value = value.to_string();
                s.updated_at = now;
                s.updated_by = actor.map(str::to_string);
            })
            .or_insert_with(|| Setting {
                id: Uuid::now_v7(),
                key: key.to_string(),
                value: value.to_string(),
                updated_at: now,
                updated_by: actor.map(str::to_string),
            });
        Ok(setting.clone())
    }

    async fn insert_media(&self, new: NewMedia, now: DateTime<Utc>) -> ContentResult<MediaAsset> {
        let asset = new.into_asset(Uuid::now_v7(), now);
        self.inner.write().await.media.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn list_media(&self) -> ContentResult<Vec<MediaAsset>> {
        let inner = self.inner.read().await;
        let mut media: Vec<MediaAsset> = inner.media.values().cloned().collect();
        media.sort_by(|a, b| (b.uploaded_at, b.id).cmp(&(a.uploaded_at, a.id)));
        Ok(media)
    }

    async fn get_media(&self, id: Uuid) -> ContentResult<Option<MediaAsset>> {
        Ok(self.inner.read().await.media.get(&id).cloned())
    }

    async fn delete_media(&self, id: Uuid) -> ContentResult<Option<MediaAsset>> {
        Ok(self.inner.write().await.media.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .create_document(NewDocument::new("summary", "Summary", ""), None, now)
            .await
            .unwrap();

        let err = store
            .create_document(NewDocument::new("summary", "Other", ""), None, now)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug(slug) if slug == "summary"));
    }

    #[tokio::test]
    async fn reorder_with_unknown_id_changes_nothing() {
        let store = MemoryStore::new();
        let doc = store
            .create_document(NewDocument::new("a", "A", ""), None, Utc::now())
            .await
            .unwrap();

        let err = store
            .apply_orders(&[
                OrderUpdate { id: doc.id, order: 40 },
                OrderUpdate { id: Uuid::from_u128(99), order: 41 },
            ])
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.get_document(doc.id).await.unwrap().unwrap().order, 1);
    }

    #[tokio::test]
    async fn purge_drops_only_stale_drafts() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let doc = store
            .create_document(NewDocument::new("a", "A", ""), None, now)
            .await
            .unwrap();
        store
            .upsert_draft(doc.id, "old", "x", now - chrono::Duration::minutes(30))
            .await
            .unwrap();
        store.upsert_draft(doc.id, "fresh", "y", now).await.unwrap();

        let purged = store
            .purge_drafts_before(now - chrono::Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(purged, 1);
        let users: Vec<_> = store
            .list_drafts(doc.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.user_id)
            .collect();
        assert_eq!(users, ["fresh"]);
    }

    #[tokio::test]
    async fn settings_upsert_by_key() {
        let store = MemoryStore::new();
        let first = store.set_setting("site_name", "GTM", None, Utc::now()).await.unwrap();
        let second = store
            .set_setting("site_name", "Strategy", Some("admin"), Utc::now())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_settings().await.unwrap().len(), 1);
        assert_eq!(
            store.get_setting("site_name").await.unwrap().unwrap().value,
            "Strategy"
        );
    }
}
