use serde::Serialize;

use super::model::{sort_documents, Document};

/// One entry in the reader's sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub title: String,
    pub slug: String,
    pub order: i64,
    /// 1-based display position among visible documents.
    pub rank: usize,
    pub href: String,
}

/// Neighbours of a page in navigation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub prev: Option<NavItem>,
    pub next: Option<NavItem>,
}

/// Build the navigation over visible documents.
///
/// The first entry is the home page and links to `/`.
pub fn navigation(docs: &[Document]) -> Vec<NavItem> {
    let mut visible: Vec<Document> = docs.iter().filter(|d| !d.hidden).cloned().collect();
    sort_documents(&mut visible);

    visible
        .into_iter()
        .enumerate()
        .map(|(index, doc)| NavItem {
            href: if index == 0 {
                "/".to_string()
            } else {
                format!("/{}", doc.slug)
            },
            title: doc.title,
            slug: doc.slug,
            order: doc.order,
            rank: index + 1,
        })
        .collect()
}

/// Previous/next links for the page with `slug`. Unknown slugs have none.
pub fn page_links(nav: &[NavItem], slug: &str) -> PageLinks {
    let Some(index) = nav.iter().position(|item| item.slug == slug) else {
        return PageLinks::default();
    };
    PageLinks {
        prev: index.checked_sub(1).map(|i| nav[i].clone()),
        next: nav.get(index + 1).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::NewDocument;
    use chrono::Utc;
    use uuid::Uuid;

    fn doc(n: u128, slug: &str, order: i64, hidden: bool) -> Document {
        NewDocument::new(slug, slug.to_uppercase(), "")
            .hidden(hidden)
            .into_document(Uuid::from_u128(n), order, Utc::now(), None)
    }

    #[test]
    fn skips_hidden_and_ranks_by_position() {
        let docs = vec![
            doc(1, "audience", 5, false),
            doc(2, "summary", 1, false),
            doc(3, "draft-notes", 2, true),
            doc(4, "reach", 9, false),
        ];
        let nav = navigation(&docs);
        let entries: Vec<_> = nav.iter().map(|n| (n.slug.as_str(), n.rank, n.href.as_str())).collect();
        assert_eq!(
            entries,
            [("summary", 1, "/"), ("audience", 2, "/audience"), ("reach", 3, "/reach")]
        );
    }

    #[test]
    fn links_neighbours() {
        let docs = vec![doc(1, "a", 1, false), doc(2, "b", 2, false), doc(3, "c", 3, false)];
        let nav = navigation(&docs);

        let middle = page_links(&nav, "b");
        assert_eq!(middle.prev.map(|n| n.href), Some("/".to_string()));
        assert_eq!(middle.next.map(|n| n.slug), Some("c".to_string()));

        let first = page_links(&nav, "a");
        assert!(first.prev.is_none());
        assert_eq!(page_links(&nav, "missing"), PageLinks::default());
    }
}
