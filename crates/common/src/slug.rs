//! URL-safe slug derivation.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^a-z0-9]+").unwrap()
});

/// Derive a URL-safe slug from a title.
///
/// Lowercases, replaces every run of non-alphanumeric characters with a
/// single hyphen, and trims leading/trailing hyphens. Returns an empty
/// string for titles with no usable characters; callers should treat that
/// as a validation failure.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_titles() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Another post about crates"), "another-post-about-crates");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("Rust: ownership & borrowing!"), "rust-ownership-borrowing");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn test_case_and_digits() {
        assert_eq!(slugify("Top 10 Crates (2026)"), "top-10-crates-2026");
    }

    #[test]
    fn test_degenerate_titles() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }
}
