//! The pending-changes overlay.
//!
//! Each editing session keeps at most one draft per document, keyed by
//! `(document_id, user_id)`. Drafts are scratch state: they never change the
//! published document, they expire when idle, and publishing a document
//! discards every draft for it. Concurrent editors are detected, not merged.

pub mod session;

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::EditorSession;

/// How long a session waits after the last keystroke before syncing.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_ID_LEN: usize = 9;

/// One editor's unsaved content for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: String,
    pub content: String,
    pub last_updated: DateTime<Utc>,
}

/// Database row representation of a pending change.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingChangeRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: String,
    pub content: String,
    pub last_updated: DateTime<Utc>,
}

impl From<PendingChangeRow> for PendingChange {
    fn from(row: PendingChangeRow) -> Self {
        PendingChange {
            id: row.id,
            document_id: row.document_id,
            user_id: row.user_id,
            content: row.content,
            last_updated: row.last_updated,
        }
    }
}

/// Expiry rule for idle drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftPolicy {
    pub ttl: Duration,
}

impl DraftPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Drafts last touched before this instant are expired.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        now.checked_sub_signed(ttl).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_live(&self, draft: &PendingChange, now: DateTime<Utc>) -> bool {
        draft.last_updated >= self.cutoff(now)
    }
}

impl Default for DraftPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

/// Number of distinct editors other than `me` holding a draft.
pub fn other_editors(drafts: &[PendingChange], me: &str) -> usize {
    drafts
        .iter()
        .map(|d| d.user_id.as_str())
        .filter(|user| *user != me)
        .collect::<BTreeSet<_>>()
        .len()
}

/// A fresh per-session editor id such as `user-k3j9x0a1b`.
/// Identifies a browser session, not an authenticated person.
pub fn generate_session_user_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SESSION_ID_LEN)
        .map(|_| SESSION_ID_ALPHABET[rng.random_range(0..SESSION_ID_ALPHABET.len())] as char)
        .collect();
    format!("user-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(user: &str, last_updated: DateTime<Utc>) -> PendingChange {
        PendingChange {
            id: Uuid::now_v7(),
            document_id: Uuid::nil(),
            user_id: user.to_string(),
            content: String::new(),
            last_updated,
        }
    }

    #[test]
    fn counts_distinct_other_editors() {
        let now = Utc::now();
        let drafts = vec![draft("me", now), draft("ana", now), draft("bo", now), draft("ana", now)];
        assert_eq!(other_editors(&drafts, "me"), 2);
        assert_eq!(other_editors(&drafts, "nobody"), 3);
        assert_eq!(other_editors(&[], "me"), 0);
    }

    #[test]
    fn policy_expires_idle_drafts() {
        let policy = DraftPolicy::new(Duration::from_secs(60));
        let now = Utc::now();
        assert!(policy.is_live(&draft("a", now - chrono::Duration::seconds(59)), now));
        assert!(!policy.is_live(&draft("a", now - chrono::Duration::seconds(61)), now));
    }

    #[test]
    fn session_ids_are_prefixed_base36() {
        let id = generate_session_user_id();
        let suffix = id.strip_prefix("user-").unwrap();
        assert_eq!(suffix.len(), SESSION_ID_LEN);
        assert!(suffix.bytes().all(|b| SESSION_ID_ALPHABET.contains(&b)));
        assert_ne!(generate_session_user_id(), id);
    }
}
