//! Human-readable text output formatter

use super::OutputFormatter;
use crate::audit::{AuditResult, SessionResult};
use crate::result::{RuleResult, Status};
use colored::*;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show passing rules, not only warnings and failures
    pub show_passes: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_passes: false,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Include passing rules in the output
    pub fn with_passes(mut self) -> Self {
        self.show_passes = true;
        self
    }

    fn status_str(&self, status: Status) -> ColoredString {
        let s = format!("{}", status);
        if !self.colored {
            return s.normal();
        }
        match status {
            Status::Pass => s.green(),
            Status::Warn => s.yellow().bold(),
            Status::Fail => s.red().bold(),
        }
    }

    fn score_str(&self, score: f64) -> String {
        let s = format!("{:.1}", score);
        if !self.colored {
            return s;
        }
        if score >= 90.0 {
            s.green().to_string()
        } else if score >= 50.0 {
            s.yellow().to_string()
        } else {
            s.red().to_string()
        }
    }

    fn format_rule(&self, result: &RuleResult) -> String {
        format!(
            "    {} [{}] {}\n",
            self.status_str(result.status),
            if self.colored {
                result.rule_id.cyan().to_string()
            } else {
                result.rule_id.clone()
            },
            result.message
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &SessionResult) -> String {
        let mut output = String::new();

        for page in &result.pages {
            output.push_str(&self.format_page(page));
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&format!(
                "{} {} audited",
                result.pages.len(),
                if result.pages.len() == 1 {
                    "page"
                } else {
                    "pages"
                }
            ));
            if result.pages_skipped > 0 {
                output.push_str(&format!(", {} skipped", result.pages_skipped));
            }

            let mut counts = Vec::new();
            if result.fail_count() > 0 {
                let s = format!(
                    "{} {}",
                    result.fail_count(),
                    if result.fail_count() == 1 {
                        "failure"
                    } else {
                        "failures"
                    }
                );
                counts.push(if self.colored { s.red().to_string() } else { s });
            }
            if result.warn_count() > 0 {
                let s = format!(
                    "{} {}",
                    result.warn_count(),
                    if result.warn_count() == 1 {
                        "warning"
                    } else {
                        "warnings"
                    }
                );
                counts.push(if self.colored {
                    s.yellow().to_string()
                } else {
                    s
                });
            }
            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            if !result.pages.is_empty() {
                output.push_str(&format!(
                    "Average score: {}\n",
                    self.score_str(result.average_score())
                ));
            }

            if let Some(stats) = &result.stats {
                output.push_str(&format!(
                    "Session: {} distinct titles, {} duplicate title group(s), {} content fingerprint(s)\n",
                    stats.titles.distinct_titles,
                    stats.titles.duplicate_groups,
                    stats.content.fingerprints
                ));
            }

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_page(&self, page: &AuditResult) -> String {
        let mut output = String::new();

        if self.colored {
            output.push_str(&format!("{}", page.url.underline()));
        } else {
            output.push_str(&page.url);
        }
        output.push_str(&format!(
            "  score {}\n",
            self.score_str(page.overall_score)
        ));

        for category in &page.categories {
            output.push_str(&format!(
                "  {}: {} ({} pass, {} warn, {} fail)\n",
                if self.colored {
                    category.category.bold().to_string()
                } else {
                    category.category.clone()
                },
                self.score_str(category.score),
                category.pass_count,
                category.warn_count,
                category.fail_count
            ));

            for result in &category.results {
                if !self.show_passes && result.is_pass() {
                    continue;
                }
                output.push_str(&self.format_rule(result));
            }
        }

        output
    }
}
