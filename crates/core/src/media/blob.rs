use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ContentError, ContentResult};

/// Where a client should send the bytes of a new upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub storage_id: String,
    pub upload_url: String,
}

/// Opaque blob storage for media and logos.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reserve a storage id and the URL to upload to.
    fn issue_upload(&self) -> UploadTicket;

    /// URL the blob is served from.
    fn url_for(&self, storage_id: &str) -> String;

    async fn put(&self, storage_id: &str, bytes: &[u8]) -> ContentResult<()>;

    async fn get(&self, storage_id: &str) -> ContentResult<Option<Vec<u8>>>;

    /// Returns whether a blob was removed.
    async fn delete(&self, storage_id: &str) -> ContentResult<bool>;
}

/// Blobs stored as files under a directory, served by the API's storage routes.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage ids are UUIDs; anything else could escape the root directory.
    fn path_for(&self, storage_id: &str) -> ContentResult<PathBuf> {
        let id = Uuid::parse_str(storage_id)
            .map_err(|_| ContentError::InvalidStorageId(storage_id.to_string()))?;
        Ok(self.root.join(id.as_hyphenated().to_string()))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn issue_upload(&self) -> UploadTicket {
        let storage_id = Uuid::new_v4().to_string();
        UploadTicket {
            upload_url: self.url_for(&storage_id),
            storage_id,
        }
    }

    fn url_for(&self, storage_id: &str) -> String {
        format!("{}/v1/storage/{storage_id}", self.base_url)
    }

    async fn put(&self, storage_id: &str, bytes: &[u8]) -> ContentResult<()> {
        let path = self.path_for(storage_id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(storage_id, size = bytes.len(), "blob stored");
        Ok(())
    }

    async fn get(&self, storage_id: &str) -> ContentResult<Option<Vec<u8>>> {
        let path = self.path_for(storage_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, storage_id: &str) -> ContentResult<bool> {
        let path = self.path_for(storage_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
