//! Media library metadata. The bytes live in a [`blob::BlobStore`].

pub mod blob;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use blob::{BlobStore, LocalBlobStore, UploadTicket};

/// Metadata for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: Uuid,
    pub filename: String,
    pub storage_id: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

/// Metadata recorded once the client has uploaded the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedia {
    pub filename: String,
    pub storage_id: String,
    pub content_type: String,
    pub size: i64,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

impl NewMedia {
    pub fn into_asset(self, id: Uuid, now: DateTime<Utc>) -> MediaAsset {
        MediaAsset {
            id,
            filename: self.filename,
            storage_id: self.storage_id,
            content_type: self.content_type,
            size: self.size,
            uploaded_at: now,
            uploaded_by: self.uploaded_by,
        }
    }
}

/// A media row together with the URL its bytes are served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaWithUrl {
    #[serde(flatten)]
    pub asset: MediaAsset,
    pub url: String,
}
