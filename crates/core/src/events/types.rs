use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted after successful mutations, consumed by SSE listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SiteEvent {
    Welcome,
    DocumentCreated(DocumentEvent),
    DocumentPublished(DocumentEvent),
    DocumentDeleted(DocumentEvent),
    #[serde(rename_all = "camelCase")]
    DocumentsReordered {
        document_ids: Vec<Uuid>,
        timestamp: DateTime<Utc>,
    },
    DraftUpdated(DraftEvent),
    DraftCleared(DraftEvent),
    /// Publishing dropped other editors' drafts.
    #[serde(rename_all = "camelCase")]
    DraftsDiscarded {
        document_id: Uuid,
        user_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    Reconnect,
}

impl SiteEvent {
    /// The document this event concerns, if it concerns a single one.
    pub fn document_id(&self) -> Option<Uuid> {
        match self {
            SiteEvent::DocumentCreated(e)
            | SiteEvent::DocumentPublished(e)
            | SiteEvent::DocumentDeleted(e) => Some(e.document_id),
            SiteEvent::DraftUpdated(e) | SiteEvent::DraftCleared(e) => Some(e.document_id),
            SiteEvent::DraftsDiscarded { document_id, .. } => Some(*document_id),
            SiteEvent::Welcome | SiteEvent::Reconnect | SiteEvent::DocumentsReordered { .. } => None,
        }
    }

    /// Whether a listener scoped to `document_id` should see this event.
    /// Site-wide events reach every listener.
    pub fn concerns(&self, document_id: Uuid) -> bool {
        match self {
            SiteEvent::DocumentsReordered { document_ids, .. } => document_ids.contains(&document_id),
            other => other.document_id().map_or(true, |id| id == document_id),
        }
    }

    /// SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            SiteEvent::Welcome => "welcome",
            SiteEvent::DocumentCreated(_) => "documentCreated",
            SiteEvent::DocumentPublished(_) => "documentPublished",
            SiteEvent::DocumentDeleted(_) => "documentDeleted",
            SiteEvent::DocumentsReordered { .. } => "documentsReordered",
            SiteEvent::DraftUpdated(_) => "draftUpdated",
            SiteEvent::DraftCleared(_) => "draftCleared",
            SiteEvent::DraftsDiscarded { .. } => "draftsDiscarded",
            SiteEvent::Reconnect => "reconnect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvent {
    pub document_id: Uuid,
    pub slug: String,
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEvent {
    pub document_id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoping_by_document() {
        let doc = Uuid::from_u128(7);
        let other = Uuid::from_u128(8);
        let draft = SiteEvent::DraftUpdated(DraftEvent {
            document_id: doc,
            user_id: "user-a".into(),
            timestamp: Utc::now(),
        });
        assert!(draft.concerns(doc));
        assert!(!draft.concerns(other));
        assert!(SiteEvent::Reconnect.concerns(other));

        let reorder = SiteEvent::DocumentsReordered {
            document_ids: vec![doc],
            timestamp: Utc::now(),
        };
        assert!(reorder.concerns(doc));
        assert!(!reorder.concerns(other));
    }

    #[test]
    fn tagged_json() {
        let event = SiteEvent::DraftsDiscarded {
            document_id: Uuid::nil(),
            user_ids: vec!["user-b".into()],
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "draftsDiscarded");
        assert_eq!(value["userIds"][0], "user-b");
    }
}
