//! JSON output formatter

use super::OutputFormatter;
use crate::audit::{AuditResult, SessionResult};
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    pages: &'a [AuditResult],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    pages_audited: usize,
    pages_skipped: usize,
    average_score: f64,
    pass_count: usize,
    warn_count: usize,
    fail_count: usize,
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    distinct_titles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplicate_title_groups: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_fingerprints: Option<usize>,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &SessionResult) -> String {
        let output = JsonOutput {
            pages: &result.pages,
            summary: JsonSummary {
                pages_audited: result.pages.len(),
                pages_skipped: result.pages_skipped,
                average_score: result.average_score(),
                pass_count: result.pass_count(),
                warn_count: result.warn_count(),
                fail_count: result.fail_count(),
                duration_ms: result.duration.as_millis(),
                distinct_titles: result.stats.as_ref().map(|s| s.titles.distinct_titles),
                duplicate_title_groups: result.stats.as_ref().map(|s| s.titles.duplicate_groups),
                content_fingerprints: result.stats.as_ref().map(|s| s.content.fingerprints),
            },
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_default()
        } else {
            serde_json::to_string(&output).unwrap_or_default()
        }
    }

    fn format_page(&self, page: &AuditResult) -> String {
        if self.pretty {
            serde_json::to_string_pretty(page).unwrap_or_default()
        } else {
            serde_json::to_string(page).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{CategoryResult, SessionResult};
    use crate::result::RuleResult;
    use chrono::Utc;
    use std::time::Duration;

    fn sample_page() -> AuditResult {
        AuditResult {
            url: "https://example.com/".to_string(),
            timestamp: Utc::now(),
            overall_score: 75.0,
            categories: vec![CategoryResult {
                category: "seo".to_string(),
                score: 75.0,
                pass_count: 1,
                warn_count: 1,
                fail_count: 0,
                results: vec![
                    RuleResult::pass("seo-title-present", "title present"),
                    RuleResult::warn("seo-title-length", "title too short"),
                ],
            }],
        }
    }

    #[test]
    fn test_json_format_page() {
        let output = JsonFormatter::new().format_page(&sample_page());
        assert!(output.contains("\"url\":\"https://example.com/\""));
        assert!(output.contains("\"overall_score\":75.0"));
        assert!(output.contains("\"rule_id\":\"seo-title-present\""));
    }

    #[test]
    fn test_json_format_session() {
        let result = SessionResult {
            pages: vec![sample_page()],
            pages_skipped: 2,
            duration: Duration::from_millis(42),
            rule_timings: Default::default(),
            stats: None,
        };

        let output = JsonFormatter::new().format(&result);
        assert!(output.contains("\"pages_audited\":1"));
        assert!(output.contains("\"pages_skipped\":2"));
        assert!(output.contains("\"duration_ms\":42"));
        assert!(!output.contains("distinct_titles"));
    }

    #[test]
    fn test_json_pretty() {
        let output = JsonFormatter::new().pretty().format_page(&sample_page());
        assert!(output.contains('\n'));
    }
}
