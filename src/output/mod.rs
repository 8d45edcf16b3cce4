//! Output formatters for audit results

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::audit::{AuditResult, SessionResult};

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire session result
    fn format(&self, result: &SessionResult) -> String;

    /// Format a single page audit
    fn format_page(&self, page: &AuditResult) -> String;
}
