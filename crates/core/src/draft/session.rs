use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{generate_session_user_id, other_editors, DEFAULT_DEBOUNCE};
use crate::document::Document;
use crate::error::ContentResult;
use crate::mutation::{DocumentPatch, PublishOutcome};
use crate::service::ContentService;

/// One editor's view of one document.
///
/// Keystrokes go through [`edit`](Self::edit), which syncs the latest
/// content as a draft once typing pauses for the debounce interval. Each
/// edit restarts the timer. Dropping the session cancels an unsent sync.
/// Must be used inside a tokio runtime.
pub struct EditorSession {
    service: ContentService,
    document_id: Uuid,
    user_id: String,
    baseline: String,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl EditorSession {
    /// Start editing `document` under a fresh session id.
    pub fn open(service: ContentService, document: &Document) -> Self {
        Self {
            service,
            document_id: document.id,
            user_id: generate_session_user_id(),
            baseline: document.content.clone(),
            debounce: DEFAULT_DEBOUNCE,
            pending: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// Record new editor content. Content identical to the published
    /// version is not synced.
    pub fn edit(&mut self, content: impl Into<String>) {
        self.cancel_pending();
        let content = content.into();
        if content == self.baseline {
            return;
        }

        let service = self.service.clone();
        let document_id = self.document_id;
        let user_id = self.user_id.clone();
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Err(err) = service.upsert_draft(document_id, &user_id, &content).await {
                tracing::warn!(document_id = %document_id, user_id = %user_id, error = %err, "draft sync failed");
            }
        }));
    }

    /// Whether a sync is scheduled but not yet finished.
    pub fn has_pending_sync(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// How many other sessions hold a draft of this document.
    pub async fn others_editing(&self) -> ContentResult<usize> {
        let drafts = self.service.list_drafts(self.document_id).await?;
        Ok(other_editors(&drafts, &self.user_id))
    }

    /// Publish `patch`, which also discards every outstanding draft.
    pub async fn save(&mut self, patch: DocumentPatch) -> ContentResult<PublishOutcome> {
        self.cancel_pending();
        let outcome = self
            .service
            .publish(self.document_id, patch, Some(&self.user_id))
            .await?;
        self.baseline = outcome.document.content.clone();
        Ok(outcome)
    }

    /// Drop this session's draft without publishing.
    pub async fn discard(&mut self) -> ContentResult<bool> {
        self.cancel_pending();
        self.service
            .clear_draft(self.document_id, &self.user_id)
            .await
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NewDocument;
    use crate::draft::DraftPolicy;
    use crate::events::EventBus;
    use crate::media::LocalBlobStore;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    async fn setup() -> (ContentService, Document) {
        let service = ContentService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LocalBlobStore::new("/nonexistent-media", "http://localhost")),
            EventBus::new(64),
            DraftPolicy::new(Duration::from_secs(3600)),
        );
        let doc = service
            .create_document(NewDocument::new("summary", "Summary", "published"), None)
            .await
            .unwrap();
        (service, doc)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn syncs_after_typing_pauses() {
        let (service, doc) = setup().await;
        let mut session = EditorSession::open(service.clone(), &doc);

        session.edit("d");
        tokio::time::sleep(ms(300)).await;
        session.edit("dr");
        tokio::time::sleep(ms(300)).await;
        assert!(service.list_drafts(doc.id).await.unwrap().is_empty());
        assert!(session.has_pending_sync());

        tokio::time::sleep(ms(300)).await;
        let drafts = service.list_drafts(doc.id).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].content, "dr");
        assert_eq!(drafts[0].user_id, session.user_id());
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_content_is_not_synced() {
        let (service, doc) = setup().await;
        let mut session = EditorSession::open(service.clone(), &doc);

        session.edit("published");
        tokio::time::sleep(ms(1000)).await;

        assert!(service.list_drafts(doc.id).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_cancels_the_write() {
        let (service, doc) = setup().await;
        let mut session = EditorSession::open(service.clone(), &doc);

        session.edit("typed then navigated away");
        drop(session);
        tokio::time::sleep(ms(1000)).await;

        assert!(service.list_drafts(doc.id).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn detects_other_editors_and_loses_their_drafts_on_save() {
        let (service, doc) = setup().await;
        let mut mine = EditorSession::open(service.clone(), &doc);
        let mut theirs = EditorSession::open(service.clone(), &doc);

        mine.edit("mine");
        theirs.edit("theirs");
        tokio::time::sleep(ms(600)).await;
        assert_eq!(mine.others_editing().await.unwrap(), 1);

        let outcome = mine.save(DocumentPatch::content("mine")).await.unwrap();

        assert_eq!(outcome.discarded_drafts.len(), 2);
        assert_eq!(theirs.others_editing().await.unwrap(), 0);
        assert!(service.list_drafts(doc.id).await.unwrap().is_empty());

        // The new published text is the baseline now.
        mine.edit("mine");
        assert!(!mine.has_pending_sync());
    }

    #[tokio::test(start_paused = true)]
    async fn discard_clears_only_own_draft() {
        let (service, doc) = setup().await;
        let mut mine = EditorSession::open(service.clone(), &doc);
        let mut theirs = EditorSession::open(service.clone(), &doc);

        mine.edit("a");
        theirs.edit("b");
        tokio::time::sleep(ms(600)).await;

        assert!(mine.discard().await.unwrap());
        let drafts = service.list_drafts(doc.id).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user_id, theirs.user_id());
    }
}
