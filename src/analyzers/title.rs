//! Title-uniqueness analyzer
//!
//! Tracks every page title seen in a crawl session. The first page with a
//! given (normalized) title owns it; later pages with the same title are
//! flagged with the full list of URLs sharing it.

use serde::Serialize;
use std::collections::HashMap;

/// Outcome of recording one page's title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    /// Page has no title at all
    Missing,
    /// First page seen with this title
    Unique,
    /// Title already registered; `urls` lists every page sharing it,
    /// in visit order, including the current page
    Duplicate { urls: Vec<String> },
}

/// Registry stats for introspection and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TitleStats {
    /// Distinct normalized titles seen
    pub distinct_titles: usize,
    /// Titles shared by more than one URL
    pub duplicate_groups: usize,
}

/// Session-scoped mapping from normalized title to the URLs that used it.
///
/// Grows monotonically; [`reset`](Self::reset) is the only way to clear
/// it between independent crawls.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    entries: HashMap<String, Vec<String>>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one page's title and report whether it is unique so far.
    ///
    /// An absent or empty title is [`TitleOutcome::Missing`] and is not
    /// registered; there is nothing to normalize or compare.
    pub fn record(&mut self, url: &str, title: Option<&str>) -> TitleOutcome {
        let raw = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return TitleOutcome::Missing,
        };

        let key = normalize_title(raw);
        let urls = self.entries.entry(key).or_default();
        urls.push(url.to_string());

        if urls.len() == 1 {
            TitleOutcome::Unique
        } else {
            TitleOutcome::Duplicate { urls: urls.clone() }
        }
    }

    /// URLs registered for a title, in visit order
    pub fn urls_for(&self, title: &str) -> Option<&[String]> {
        self.entries
            .get(&normalize_title(title))
            .map(Vec::as_slice)
    }

    /// Clear all entries for a new independent crawl
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> TitleStats {
        TitleStats {
            distinct_titles: self.entries.len(),
            duplicate_groups: self.entries.values().filter(|urls| urls.len() > 1).count(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a title for comparison: lowercase, trim, collapse internal
/// whitespace runs to a single space.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Home | Acme"), "home | acme");
        assert_eq!(normalize_title("  home   |   acme  "), "home | acme");
        assert_eq!(normalize_title("HOME\t|\nACME"), "home | acme");
    }

    #[test]
    fn test_missing_title() {
        let mut registry = TitleRegistry::new();
        assert_eq!(registry.record("https://a/", None), TitleOutcome::Missing);
        assert_eq!(
            registry.record("https://a/", Some("   ")),
            TitleOutcome::Missing
        );
        // Missing titles are not registered
        assert!(registry.is_empty());
    }

    #[test]
    fn test_first_title_is_unique() {
        let mut registry = TitleRegistry::new();
        assert_eq!(
            registry.record("https://a/", Some("Home | Acme")),
            TitleOutcome::Unique
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_case_and_whitespace_variants_collide() {
        let mut registry = TitleRegistry::new();
        registry.record("https://a/", Some("Home | Acme"));

        let outcome = registry.record("https://b/", Some("home   |   acme"));
        assert_eq!(
            outcome,
            TitleOutcome::Duplicate {
                urls: vec!["https://a/".to_string(), "https://b/".to_string()],
            }
        );
        // Still a single distinct title
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_list_preserves_visit_order() {
        let mut registry = TitleRegistry::new();
        registry.record("https://1/", Some("T"));
        registry.record("https://2/", Some("t"));
        let outcome = registry.record("https://3/", Some(" T "));

        let TitleOutcome::Duplicate { urls } = outcome else {
            panic!("expected duplicate");
        };
        assert_eq!(urls, vec!["https://1/", "https://2/", "https://3/"]);
    }

    #[test]
    fn test_stats_and_reset() {
        let mut registry = TitleRegistry::new();
        registry.record("https://a/", Some("One"));
        registry.record("https://b/", Some("Two"));
        registry.record("https://c/", Some("one"));

        let stats = registry.stats();
        assert_eq!(stats.distinct_titles, 2);
        assert_eq!(stats.duplicate_groups, 1);

        registry.reset();
        let stats = registry.stats();
        assert_eq!(stats.distinct_titles, 0);
        assert_eq!(stats.duplicate_groups, 0);
    }

    #[test]
    fn test_urls_for_normalizes_lookup() {
        let mut registry = TitleRegistry::new();
        registry.record("https://a/", Some("Home | Acme"));
        assert_eq!(
            registry.urls_for("HOME   | acme"),
            Some(&["https://a/".to_string()][..])
        );
        assert_eq!(registry.urls_for("other"), None);
    }
}
