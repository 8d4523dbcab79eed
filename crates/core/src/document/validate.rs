/// Document validation utilities.
use thiserror::Error;

use super::model::NewDocument;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("document slug cannot be empty")]
    EmptySlug,
    #[error("document slug '{0}' is not URL-safe (use lowercase letters, digits and single hyphens)")]
    InvalidSlug(String),
    #[error("document title cannot be empty")]
    EmptyTitle,
    #[error("document order {0} is out of range (allowed: -1000000000 to 1000000000)")]
    OrderOutOfRange(i64),
}

/// Largest magnitude accepted for a navigation position. Keeps `max + 1`
/// appends representable in both stores.
pub const MAX_ORDER: i64 = 1_000_000_000;

/// A slug is lowercase ASCII alphanumerics separated by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::EmptySlug);
    }
    let well_formed = slug
        .split('-')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    if !well_formed {
        return Err(ValidationError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_order(order: i64) -> Result<(), ValidationError> {
    if !(-MAX_ORDER..=MAX_ORDER).contains(&order) {
        return Err(ValidationError::OrderOutOfRange(order));
    }
    Ok(())
}

/// Validate that a new document has the minimum required fields.
pub fn validate_new_document(doc: &NewDocument) -> Result<(), ValidationError> {
    validate_title(&doc.title)?;
    validate_slug(&doc.slug)?;
    if let Some(order) = doc.order {
        validate_order(order)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_url_safe_slugs() {
        assert!(validate_slug("executive-summary").is_ok());
        assert!(validate_slug("first-1000").is_ok());
        assert!(validate_slug("cex2onchain").is_ok());
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert_eq!(validate_slug(""), Err(ValidationError::EmptySlug));
        for bad in ["-lead", "trail-", "double--dash", "Upper", "with space", "a/b"] {
            assert_eq!(
                validate_slug(bad),
                Err(ValidationError::InvalidSlug(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn title_must_have_text() {
        let doc = NewDocument::new("audience", "   ", "");
        assert_eq!(validate_new_document(&doc), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn order_is_bounded() {
        assert!(validate_order(MAX_ORDER).is_ok());
        assert!(validate_order(-MAX_ORDER).is_ok());
        assert_eq!(
            validate_order(i64::MAX),
            Err(ValidationError::OrderOutOfRange(i64::MAX))
        );
        let doc = NewDocument::new("audience", "Audience", "").with_order(i64::MIN);
        assert_eq!(
            validate_new_document(&doc),
            Err(ValidationError::OrderOutOfRange(i64::MIN))
        );
    }
}
