//! Near-duplicate content analyzer
//!
//! Fingerprints each page as the set of word trigrams from the start of
//! its visible text, then compares new pages against every previously
//! registered fingerprint with Jaccard similarity. The scan is O(N²) over
//! qualifying pages, an accepted trade-off for bounded crawl sizes;
//! switching to an indexed or approximate method (minhashing) would change
//! the similarity semantics.

use serde::Serialize;
use std::collections::HashSet;

/// Minimum collapsed text length to bother comparing
pub const MIN_CONTENT_CHARS: usize = 100;

/// Fingerprints use at most this many leading words
pub const MAX_FINGERPRINT_WORDS: usize = 500;

/// Fewer distinct trigrams than this is too little signal to compare
pub const MIN_TRIGRAMS: usize = 5;

/// Similarity above this is a near-duplicate
pub const DUPLICATE_THRESHOLD: f64 = 0.8;

/// Similarity above this (up to the duplicate threshold) is merely similar
pub const SIMILAR_THRESHOLD: f64 = 0.6;

/// Outcome of recording one page's content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOutcome {
    /// Text shorter than [`MIN_CONTENT_CHARS`]; page was NOT registered
    InsufficientContent,
    /// Fewer than [`MIN_TRIGRAMS`] distinct trigrams; page WAS registered
    /// but not compared
    FewTrigrams,
    /// Similarity above [`DUPLICATE_THRESHOLD`] with an earlier page
    NearDuplicate { url: String, similarity: f64 },
    /// Similarity in ([`SIMILAR_THRESHOLD`], [`DUPLICATE_THRESHOLD`]]
    Similar { url: String, similarity: f64 },
    /// No earlier page came close; `best` names the closest one, if any
    Distinct { best: Option<(String, f64)> },
}

#[derive(Debug)]
struct Fingerprint {
    url: String,
    trigrams: HashSet<String>,
}

/// Session-scoped list of content fingerprints, one per page that had
/// enough content to compare. Ordered by visit; explicit reset required
/// between independent crawls.
#[derive(Debug, Default)]
pub struct NearDuplicateRegistry {
    entries: Vec<Fingerprint>,
}

impl NearDuplicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one page's visible body text and compare it against every
    /// previously registered page.
    pub fn record(&mut self, url: &str, body_text: &str) -> ContentOutcome {
        let text = collapse_text(body_text);
        if text.chars().count() < MIN_CONTENT_CHARS {
            // Short pages carry no comparable signal and are not
            // registered, unlike the low-trigram case below.
            return ContentOutcome::InsufficientContent;
        }

        let trigrams = trigram_set(&text);
        if trigrams.len() < MIN_TRIGRAMS {
            self.entries.push(Fingerprint {
                url: url.to_string(),
                trigrams,
            });
            return ContentOutcome::FewTrigrams;
        }

        let mut best: Option<(String, f64)> = None;
        for prior in &self.entries {
            let similarity = jaccard_similarity(&trigrams, &prior.trigrams);
            let improves = best.as_ref().is_none_or(|(_, s)| similarity > *s);
            if improves {
                best = Some((prior.url.clone(), similarity));
            }
        }

        self.entries.push(Fingerprint {
            url: url.to_string(),
            trigrams,
        });

        match best {
            Some((url, similarity)) if similarity > DUPLICATE_THRESHOLD => {
                ContentOutcome::NearDuplicate { url, similarity }
            }
            Some((url, similarity)) if similarity > SIMILAR_THRESHOLD => {
                ContentOutcome::Similar { url, similarity }
            }
            other => ContentOutcome::Distinct { best: other },
        }
    }

    /// Number of registered fingerprints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all fingerprints for a new independent crawl
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> ContentStats {
        ContentStats {
            fingerprints: self.entries.len(),
        }
    }
}

/// Registry stats for introspection and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    /// Pages with a registered fingerprint
    pub fingerprints: usize,
}

/// Collapse whitespace and lowercase, the canonical comparison form
fn collapse_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the set of consecutive 3-word sequences from the first
/// [`MAX_FINGERPRINT_WORDS`] alphanumeric words.
fn trigram_set(text: &str) -> HashSet<String> {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(MAX_FINGERPRINT_WORDS)
        .collect();

    words.windows(3).map(|w| w.join(" ")).collect()
}

/// Jaccard similarity of two sets: |intersection| / |union|.
///
/// Two empty sets are identical (1.0); exactly one empty set shares
/// nothing (0.0). Callers short-circuit low-signal pages before reaching
/// this, but the primitive preserves the standard convention regardless.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}
