/// Conversions between titles, slugs and seed filenames.
///
/// Seed files are named `NN-some-slug.md`; the numeric prefix is the
/// document's position and the rest is its slug.

const MARKDOWN_EXT: &str = ".md";

/// Derive a URL-safe slug from a free-form title.
///
/// `"CEX to On-Chain!"` becomes `"cex-to-on-chain"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `"01-executive-summary.md"` → `"executive-summary"`.
pub fn filename_to_slug(filename: &str) -> String {
    let stem = filename.strip_suffix(MARKDOWN_EXT).unwrap_or(filename);
    match split_numeric_prefix(stem) {
        Some((_, rest)) => rest.to_string(),
        None => stem.to_string(),
    }
}

/// `"executive-summary"` → `"Executive Summary"`.
pub fn slug_to_title(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"01-executive-summary.md"` → `Some(1)`; no numeric prefix → `None`.
pub fn extract_order(filename: &str) -> Option<i64> {
    split_numeric_prefix(filename).and_then(|(digits, _)| digits.parse().ok())
}

pub fn is_markdown_file(filename: &str) -> bool {
    filename.ends_with(MARKDOWN_EXT)
}

fn split_numeric_prefix(name: &str) -> Option<(&str, &str)> {
    let (digits, rest) = name.split_once('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Executive Summary"), "executive-summary");
        assert_eq!(slugify("  CEX to On-Chain!  "), "cex-to-on-chain");
        assert_eq!(slugify("Community & Brand"), "community-brand");
        assert_eq!(slugify("First 1000"), "first-1000");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn filename_round_trip() {
        assert_eq!(filename_to_slug("01-executive-summary.md"), "executive-summary");
        assert_eq!(filename_to_slug("appendix.md"), "appendix");
        assert_eq!(slug_to_title("executive-summary"), "Executive Summary");
        assert_eq!(extract_order("01-executive-summary.md"), Some(1));
        assert_eq!(extract_order("12-x.md"), Some(12));
        assert_eq!(extract_order("appendix.md"), None);
        assert_eq!(extract_order("v2-notes.md"), None);
    }

    #[test]
    fn markdown_detection() {
        assert!(is_markdown_file("01-a.md"));
        assert!(!is_markdown_file("logo.png"));
    }
}
