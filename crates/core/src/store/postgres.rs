use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentStore;
use crate::document::model::DocumentRow;
use crate::document::{Document, NewDocument};
use crate::draft::{PendingChange, PendingChangeRow};
use crate::error::{ContentError, ContentResult};
use crate::media::{MediaAsset, NewMedia};
use crate::mutation::{DocumentPatch, OrderUpdate, PublishOutcome};
use crate::settings::Setting;

const DOCUMENT_COLUMNS: &str = "id, slug, title, content, sort_order, hidden, header_style, \
     header_label, header_title, header_accent, updated_at, updated_by";

/// PostgreSQL-backed store. Multi-row operations run in a transaction.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a connection pool for `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> ContentResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

fn slug_conflict(err: sqlx::Error, slug: &str) -> ContentError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ContentError::DuplicateSlug(slug.to_string())
        }
        _ => err.into(),
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn ping(&self) -> ContentResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_documents(&self) -> ContentResult<Vec<Document>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY sort_order, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn get_document(&self, id: Uuid) -> ContentResult<Option<Document>> {
        let row: Option<DocumentRow> =
            sqlx::query_as(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Document::from))
    }

    async fn get_document_by_slug(&self, slug: &str) -> ContentResult<Option<Document>> {
        let row: Option<DocumentRow> =
            sqlx::query_as(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Document::from))
    }

    async fn create_document(
        &self,
        new: NewDocument,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<Document> {
        let row: DocumentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO documents ({DOCUMENT_COLUMNS})
            VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (SELECT COALESCE(MAX(sort_order) + 1, 1) FROM documents)),
                $6, $7, $8, $9, $10, $11, $12
            )
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&new.slug)
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.order)
        .bind(new.hidden)
        .bind(&new.header_style)
        .bind(&new.header_label)
        .bind(&new.header_title)
        .bind(&new.header_accent)
        .bind(now)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &new.slug))?;
        Ok(row.into())
    }

    async fn publish_document(
        &self,
        id: Uuid,
        patch: &DocumentPatch,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<PublishOutcome> {
        let mut tx = self.pool.begin().await?;

        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE documents SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                sort_order = COALESCE($4, sort_order),
                hidden = COALESCE($5, hidden),
                header_style = COALESCE($6, header_style),
                header_label = COALESCE($7, header_label),
                header_title = COALESCE($8, header_title),
                header_accent = COALESCE($9, header_accent),
                updated_at = $10,
                updated_by = $11
            WHERE id = $1
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(patch.order)
        .bind(patch.hidden)
        .bind(&patch.header_style)
        .bind(&patch.header_label)
        .bind(&patch.header_title)
        .bind(&patch.header_accent)
        .bind(now)
        .bind(actor)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(ContentError::not_found("document", id));
        };

        let mut discarded_drafts: Vec<String> =
            sqlx::query_scalar("DELETE FROM pending_changes WHERE document_id = $1 RETURNING user_id")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        discarded_drafts.sort();

        tx.commit().await?;
        Ok(PublishOutcome {
            document: row.into(),
            discarded_drafts,
        })
    }

    async fn delete_document(&self, id: Uuid) -> ContentResult<Document> {
        // pending_changes rows go with it through ON DELETE CASCADE.
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            "DELETE FROM documents WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Document::from)
            .ok_or_else(|| ContentError::not_found("document", id))
    }

    async fn apply_orders(&self, updates: &[OrderUpdate]) -> ContentResult<()> {
        let mut tx = self.pool.begin().await?;
        for update in updates {
            let result = sqlx::query("UPDATE documents SET sort_order = $2 WHERE id = $1")
                .bind(update.id)
                .bind(update.order)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                // Dropping `tx` rolls the batch back.
                return Err(ContentError::not_found("document", update.id));
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn upsert_draft(
        &self,
        document_id: Uuid,
        user_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> ContentResult<PendingChange> {
        let row: PendingChangeRow = sqlx::query_as(
            r#"
            INSERT INTO pending_changes (id, document_id, user_id, content, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (document_id, user_id) DO UPDATE
                SET content = EXCLUDED.content,
                    last_updated = EXCLUDED.last_updated
            RETURNING id, document_id, user_id, content, last_updated
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(document_id)
        .bind(user_id)
        .bind(content)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ContentError::not_found("document", document_id)
            }
            _ => err.into(),
        })?;
        Ok(row.into())
    }

    async fn list_drafts(&self, document_id: Uuid) -> ContentResult<Vec<PendingChange>> {
        let rows: Vec<PendingChangeRow> = sqlx::query_as(
            "SELECT id, document_id, user_id, content, last_updated \
             FROM pending_changes WHERE document_id = $1 ORDER BY user_id",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PendingChange::from).collect())
    }

    async fn clear_draft(&self, document_id: Uuid, user_id: &str) -> ContentResult<bool> {
        let result =
            sqlx::query("DELETE FROM pending_changes WHERE document_id = $1 AND user_id = $2")
                .bind(document_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_drafts_before(&self, cutoff: DateTime<Utc>) -> ContentResult<u64> {
        let result = sqlx::query("DELETE FROM pending_changes WHERE last_updated < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_setting(&self, key: &str) -> ContentResult<Option<Setting>> {
        let setting = sqlx::query_as(
            "SELECT id, key, value, updated_at, updated_by FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(setting)
    }

    async fn list_settings(&self) -> ContentResult<Vec<Setting>> {
        let settings =
            sqlx::query_as("SELECT id, key, value, updated_at, updated_by FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;
        Ok(settings)
    }

    async fn set_setting(
        &self,
        key: &str,
        value: &str,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ContentResult<Setting> {
        let setting = sqlx::query_as(
            r#"
            INSERT INTO settings (id, key, value, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value,
                    updated_at = EXCLUDED.updated_at,
                    updated_by = EXCLUDED.updated_by
            RETURNING id, key, value, updated_at, updated_by
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(key)
        .bind(value)
        .bind(now)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;
        Ok(setting)
    }

    async fn insert_media(&self, new: NewMedia, now: DateTime<Utc>) -> ContentResult<MediaAsset> {
        let asset = sqlx::query_as(
            r#"
            INSERT INTO media (id, filename, storage_id, content_type, size, uploaded_at, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, filename, storage_id, content_type, size, uploaded_at, uploaded_by
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&new.filename)
        .bind(&new.storage_id)
        .bind(&new.content_type)
        .bind(new.size)
        .bind(now)
        .bind(&new.uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(asset)
    }

    async fn list_media(&self) -> ContentResult<Vec<MediaAsset>> {
        let media = sqlx::query_as(
            "SELECT id, filename, storage_id, content_type, size, uploaded_at, uploaded_by \
             FROM media ORDER BY uploaded_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(media)
    }

    async fn get_media(&self, id: Uuid) -> ContentResult<Option<MediaAsset>> {
        let asset = sqlx::query_as(
            "SELECT id, filename, storage_id, content_type, size, uploaded_at, uploaded_by \
             FROM media WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(asset)
    }

    async fn delete_media(&self, id: Uuid) -> ContentResult<Option<MediaAsset>> {
        let asset = sqlx::query_as(
            "DELETE FROM media WHERE id = $1 \
             RETURNING id, filename, storage_id, content_type, size, uploaded_at, uploaded_by",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(asset)
    }
}
