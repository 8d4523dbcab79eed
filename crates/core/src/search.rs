//! Case-insensitive substring search over the published documents.
//!
//! A full scan on every query: the site holds a few dozen documents.

use serde::Serialize;
use uuid::Uuid;

use crate::document::Document;

/// Score added when the title contains the query.
pub const TITLE_MATCH_BONUS: u32 = 100;
/// Characters of context kept on each side of a match.
pub const EXCERPT_RADIUS: usize = 50;
/// Excerpts returned per document.
pub const MAX_EXCERPTS: usize = 3;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub order: i64,
    pub title_match: bool,
    pub score: u32,
    pub matches: Vec<Excerpt>,
}

/// A window of content around one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub text: String,
    /// Character offset of the match in the content.
    pub position: usize,
}

/// Rank visible documents against `query`, best first.
///
/// A title hit is worth [`TITLE_MATCH_BONUS`]; every content occurrence is
/// worth one. Documents scoring zero are dropped. Equal scores keep the
/// input order.
pub fn search(docs: &[Document], query: &str) -> Vec<SearchHit> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = docs
        .iter()
        .filter(|doc| !doc.hidden)
        .filter_map(|doc| score_document(doc, &needle))
        .collect();
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits
}

fn score_document(doc: &Document, needle: &[char]) -> Option<SearchHit> {
    let title_match = find_all(&fold(&doc.title), needle).next().is_some();

    let content: Vec<char> = doc.content.chars().collect();
    let folded = fold_chars(&content);
    let positions: Vec<usize> = find_all(&folded, needle).collect();

    let score = positions.len() as u32 + if title_match { TITLE_MATCH_BONUS } else { 0 };
    if score == 0 {
        return None;
    }

    let matches = positions
        .iter()
        .take(MAX_EXCERPTS)
        .map(|&position| Excerpt {
            text: excerpt(&content, position, needle.len()),
            position,
        })
        .collect();

    Some(SearchHit {
        id: doc.id,
        slug: doc.slug.clone(),
        title: doc.title.clone(),
        order: doc.order,
        title_match,
        score,
        matches,
    })
}

/// Lowercase one char at a time so offsets line up with the original text.
fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

fn fold_chars(chars: &[char]) -> Vec<char> {
    chars.iter().copied().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Start offsets of non-overlapping occurrences of `needle` in `haystack`.
fn find_all<'a>(haystack: &'a [char], needle: &'a [char]) -> impl Iterator<Item = usize> + 'a {
    let mut from = 0;
    std::iter::from_fn(move || {
        if needle.is_empty() || haystack.len() < needle.len() {
            return None;
        }
        while from + needle.len() <= haystack.len() {
            let at = from;
            if haystack[at..at + needle.len()] == *needle {
                from = at + needle.len();
                return Some(at);
            }
            from += 1;
        }
        None
    })
}

fn excerpt(content: &[char], position: usize, len: usize) -> String {
    let start = position.saturating_sub(EXCERPT_RADIUS);
    let end = (position + len + EXCERPT_RADIUS).min(content.len());

    let mut text = String::new();
    if start > 0 {
        text.push_str(ELLIPSIS);
    }
    text.extend(&content[start..end]);
    if end < content.len() {
        text.push_str(ELLIPSIS);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NewDocument;
    use chrono::Utc;
    use proptest::prelude::*;

    fn doc(n: u128, title: &str, content: &str) -> Document {
        NewDocument::new(format!("doc-{n}"), title, content).into_document(
            Uuid::from_u128(n),
            n as i64,
            Utc::now(),
            None,
        )
    }

    #[test]
    fn title_match_outranks_content_match() {
        let docs = vec![
            doc(1, "Executive Summary", "We serve traders."),
            doc(2, "Audience", "Executive decisions matter."),
        ];

        let hits = search(&docs, "executive");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Executive Summary");
        assert!(hits[0].title_match);
        assert!(hits[0].score >= TITLE_MATCH_BONUS);
        assert!(hits[0].matches.is_empty());
        assert_eq!(hits[1].title, "Audience");
        assert_eq!(hits[1].score, 1);
        assert_eq!(hits[1].matches[0].text, "Executive decisions matter.");
    }

    #[test]
    fn hidden_documents_are_not_searched() {
        let mut secret = doc(1, "Executive Plan", "executive executive");
        secret.hidden = true;
        let docs = vec![secret, doc(2, "Public", "nothing here")];

        assert!(search(&docs, "executive").is_empty());
    }

    #[test]
    fn counts_every_occurrence_but_keeps_three_excerpts() {
        let content = "token ".repeat(5);
        let hits = search(&[doc(1, "Incentives", &content)], "TOKEN");

        assert_eq!(hits[0].score, 5);
        assert_eq!(hits[0].matches.len(), MAX_EXCERPTS);
        assert_eq!(
            hits[0].matches.iter().map(|m| m.position).collect::<Vec<_>>(),
            [0, 6, 12]
        );
    }

    #[test]
    fn long_content_is_ellipsized() {
        let content = format!("{}needle{}", "a".repeat(80), "b".repeat(80));
        let hits = search(&[doc(1, "Long", &content)], "needle");
        let text = &hits[0].matches[0].text;

        assert_eq!(hits[0].matches[0].position, 80);
        assert!(text.starts_with("..."));
        assert!(text.ends_with("..."));
        assert_eq!(text.len(), 3 + 50 + 6 + 50 + 3);
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(search(&[doc(1, "Anything", "at all")], "   ").is_empty());
    }

    #[test]
    fn excerpts_respect_multibyte_text() {
        let hits = search(&[doc(1, "Überblick", "Die Märkte wachsen")], "MÄRKTE");
        assert_eq!(hits[0].matches[0].text, "Die Märkte wachsen");
        assert!(search(&[doc(2, "Überblick", "")], "über")[0].title_match);
    }

    proptest! {
        #[test]
        fn results_are_sorted_and_positive(
            titles in proptest::collection::vec("[a-c ]{0,12}", 1..8),
            contents in proptest::collection::vec("[a-c ]{0,40}", 1..8),
            query in "[a-c]{1,2}",
        ) {
            let docs: Vec<Document> = titles
                .iter()
                .zip(contents.iter())
                .enumerate()
                .map(|(i, (t, c))| doc(i as u128 + 1, t, c))
                .collect();

            let hits = search(&docs, &query);

            prop_assert!(hits.iter().all(|h| h.score > 0));
            prop_assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
            prop_assert!(hits.iter().all(|h| h.matches.len() <= MAX_EXCERPTS));
            for hit in &hits {
                prop_assert_eq!(hit.title_match, hit.score >= TITLE_MATCH_BONUS);
            }
        }
    }
}
