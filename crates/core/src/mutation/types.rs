/// Mutation payloads accepted by the document endpoints.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// Partial update applied when a document is published.
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_accent: Option<String>,
}

impl DocumentPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Apply the set fields onto `doc`. Audit fields are stamped by the store.
    pub fn apply_to(&self, doc: &mut Document) {
        if let Some(title) = &self.title {
            doc.title = title.clone();
        }
        if let Some(content) = &self.content {
            doc.content = content.clone();
        }
        if let Some(order) = self.order {
            doc.order = order;
        }
        if let Some(hidden) = self.hidden {
            doc.hidden = hidden;
        }
        if let Some(style) = &self.header_style {
            doc.header_style = Some(style.clone());
        }
        if let Some(label) = &self.header_label {
            doc.header_label = Some(label.clone());
        }
        if let Some(title) = &self.header_title {
            doc.header_title = Some(title.clone());
        }
        if let Some(accent) = &self.header_accent {
            doc.header_accent = Some(accent.clone());
        }
    }
}

/// One `(id, order)` pair of a reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub updates: Vec<OrderUpdate>,
}

/// Outcome of a publish: the new canonical row and whose drafts were dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub document: Document,
    pub discarded_drafts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResult {
    pub id: Uuid,
    pub operation: String,
}

impl MutationResult {
    pub fn new(id: Uuid, operation: &str) -> Self {
        Self {
            id,
            operation: operation.to_string(),
        }
    }
}
