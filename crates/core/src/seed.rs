//! Initial content from a directory of `NN-slug.md` files.

use std::path::Path;

use crate::document::slug::{extract_order, filename_to_slug, is_markdown_file, slug_to_title, slugify};
use crate::document::NewDocument;

const FRONT_MATTER_FENCE: &str = "---";

/// A document parsed from a seed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDocument {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub order: i64,
}

impl SeedDocument {
    pub fn into_new_document(self) -> NewDocument {
        NewDocument::new(self.slug, self.title, self.content).with_order(self.order)
    }
}

/// Parse one seed file. `index` is its position in the directory listing and
/// supplies the order when the filename has no numeric prefix.
pub fn parse_seed_file(filename: &str, raw: &str, index: usize) -> SeedDocument {
    let content = strip_front_matter(raw).to_string();
    let slug = slugify(&filename_to_slug(filename));
    let title = first_heading(&content)
        .map(str::to_string)
        .unwrap_or_else(|| slug_to_title(&slug));
    let order = extract_order(filename).unwrap_or(index as i64 + 1);

    SeedDocument {
        slug,
        title,
        content,
        order,
    }
}

/// Read every markdown file in `dir`, sorted by filename.
pub async fn load_seed_dir(dir: &Path) -> std::io::Result<Vec<SeedDocument>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_markdown_file(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    let mut docs = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let raw = tokio::fs::read_to_string(dir.join(name)).await?;
        docs.push(parse_seed_file(name, &raw, index));
    }
    Ok(docs)
}

fn strip_front_matter(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix(FRONT_MATTER_FENCE) else {
        return raw;
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return raw;
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == FRONT_MATTER_FENCE {
            return rest[offset..].trim_start_matches(|c: char| c == '\r' || c == '\n');
        }
    }
    raw
}

fn first_heading(content: &str) -> Option<&str> {
    content.lines().find_map(|line| {
        let text = line.strip_prefix("# ")?.trim();
        (!text.is_empty()).then_some(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_comes_from_first_heading() {
        let doc = parse_seed_file("02-target-audience.md", "intro\n# Target Audience\n## Segments\n", 0);
        assert_eq!(doc.slug, "target-audience");
        assert_eq!(doc.title, "Target Audience");
        assert_eq!(doc.order, 2);
    }

    #[test]
    fn falls_back_to_slug_and_index() {
        let doc = parse_seed_file("appendix-notes.md", "no heading here", 4);
        assert_eq!(doc.title, "Appendix Notes");
        assert_eq!(doc.order, 5);
    }

    #[test]
    fn filenames_are_normalized_into_slugs() {
        let doc = parse_seed_file("03-Launch_Plan.md", "", 0);
        assert_eq!(doc.slug, "launch-plan");
        assert_eq!(doc.title, "Launch Plan");
        assert_eq!(doc.order, 3);
    }

    #[test]
    fn front_matter_is_stripped() {
        let raw = "---\ntitle: ignored\ntags: [a]\n---\n\n# Summary\nBody";
        let doc = parse_seed_file("01-summary.md", raw, 0);
        assert_eq!(doc.content, "# Summary\nBody");
        assert_eq!(doc.title, "Summary");

        let unterminated = "---\nstill going";
        assert_eq!(strip_front_matter(unterminated), unterminated);
    }

    #[tokio::test]
    async fn loads_markdown_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02-b.md"), "# B").unwrap();
        std::fs::write(dir.path().join("01-a.md"), "# A").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let docs = load_seed_dir(dir.path()).await.unwrap();

        let slugs: Vec<_> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b"]);
    }

    #[tokio::test]
    async fn seeding_skips_existing_slugs() {
        use crate::draft::DraftPolicy;
        use crate::events::EventBus;
        use crate::media::LocalBlobStore;
        use crate::store::MemoryStore;
        use crate::ContentService;
        use std::sync::Arc;

        let svc = ContentService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LocalBlobStore::new("/nonexistent-media", "http://localhost")),
            EventBus::new(8),
            DraftPolicy::default(),
        );
        let docs = vec![
            parse_seed_file("01-summary.md", "# Summary", 0),
            parse_seed_file("02-audience.md", "# Audience", 1),
        ];

        let first = svc.seed(docs.clone()).await.unwrap();
        let second = svc.seed(docs).await.unwrap();

        assert_eq!((first.created, first.skipped), (2, 0));
        assert_eq!((second.created, second.skipped), (0, 2));
    }
}
