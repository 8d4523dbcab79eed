use thiserror::Error;

use crate::document::validate::ValidationError;

/// Errors raised by content operations and the stores behind them.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("a document with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid storage id: {0}")]
    InvalidStorageId(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("blob storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ContentError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

pub type ContentResult<T> = Result<T, ContentError>;
