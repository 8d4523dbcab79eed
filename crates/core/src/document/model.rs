use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published strategy document.
/// Maps to the `documents` PostgreSQL table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Navigation position. Not unique; ties break on `id`.
    pub order: i64,
    #[serde(default)]
    pub hidden: bool,
    // Header fields are opaque to the backend and only read by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_accent: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Document {
    /// Display ordering key: `order` ascending, then id.
    pub fn sort_key(&self) -> (i64, Uuid) {
        (self.order, self.id)
    }
}

/// Sort documents into navigation order in place.
pub fn sort_documents(docs: &mut [Document]) {
    docs.sort_by_key(Document::sort_key);
}

/// Input for creating a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Explicit position; `None` appends after the current maximum.
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub header_style: Option<String>,
    #[serde(default)]
    pub header_label: Option<String>,
    #[serde(default)]
    pub header_title: Option<String>,
    #[serde(default)]
    pub header_accent: Option<String>,
}

impl NewDocument {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Materialize the row once the store has settled id, order and timestamp.
    pub fn into_document(
        self,
        id: Uuid,
        order: i64,
        now: DateTime<Utc>,
        actor: Option<&str>,
    ) -> Document {
        Document {
            id,
            slug: self.slug,
            title: self.title,
            content: self.content,
            order,
            hidden: self.hidden,
            header_style: self.header_style,
            header_label: self.header_label,
            header_title: self.header_title,
            header_accent: self.header_accent,
            updated_at: now,
            updated_by: actor.map(str::to_string),
        }
    }
}

/// Next free position: one past the current maximum, or 1 for an empty set.
/// Saturates at `i64::MAX`; ties then fall back to id order.
pub fn next_order<I>(orders: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    orders.into_iter().max().map_or(1, |max| max.saturating_add(1))
}

/// Database row representation of a document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub sort_order: i64,
    pub hidden: bool,
    pub header_style: Option<String>,
    pub header_label: Option<String>,
    pub header_title: Option<String>,
    pub header_accent: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            slug: row.slug,
            title: row.title,
            content: row.content,
            order: row.sort_order,
            hidden: row.hidden,
            header_style: row.header_style,
            header_label: row.header_label,
            header_title: row.header_title,
            header_accent: row.header_accent,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_order_follows_maximum() {
        assert_eq!(next_order([1, 3, 5]), 6);
        assert_eq!(next_order([5, 3, 1]), 6);
        assert_eq!(next_order(std::iter::empty()), 1);
        assert_eq!(next_order([i64::MAX, 2]), i64::MAX);
    }

    #[test]
    fn ties_break_on_id() {
        let now = Utc::now();
        let first = NewDocument::new("a", "A", "").into_document(Uuid::from_u128(1), 2, now, None);
        let second = NewDocument::new("b", "B", "").into_document(Uuid::from_u128(2), 2, now, None);
        let top = NewDocument::new("c", "C", "").into_document(Uuid::from_u128(3), 1, now, None);

        let mut docs = vec![second.clone(), top.clone(), first.clone()];
        sort_documents(&mut docs);
        let slugs: Vec<_> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["c", "a", "b"]);
    }

    #[test]
    fn serializes_camel_case() {
        let doc = NewDocument::new("audience", "Audience", "body")
            .into_document(Uuid::nil(), 4, Utc::now(), Some("editor"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["order"], 4);
        assert_eq!(value["hidden"], false);
        assert_eq!(value["updatedBy"], "editor");
        assert!(value.get("headerStyle").is_none());
    }
}
