//! Rule definition and validation

use crate::page::PageContext;
use crate::result::RuleResult;
use crate::session::CrawlSession;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Allowed weight range for category aggregation
pub const WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Check body for a rule that only reads its own page
pub type StatelessCheck = Arc<dyn Fn(&PageContext) -> RuleResult + Send + Sync>;

/// Check body for a cross-page rule that reads and appends session state
pub type StatefulCheck = Arc<dyn Fn(&PageContext, &mut CrawlSession) -> RuleResult + Send + Sync>;

/// Executable check body.
///
/// The split drives the scheduler: stateless checks may run concurrently,
/// stateful checks run strictly sequentially in crawl order.
#[derive(Clone)]
pub enum Check {
    Stateless(StatelessCheck),
    Stateful(StatefulCheck),
}

impl Check {
    /// Whether this check mutates session state
    pub fn is_stateful(&self) -> bool {
        matches!(self, Check::Stateful(_))
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Check::Stateless(_) => write!(f, "Check::Stateless"),
            Check::Stateful(_) => write!(f, "Check::Stateful"),
        }
    }
}

/// Error validating a rule definition.
///
/// Definition problems are a programmer error detected before any audit
/// runs; they should halt startup.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rule failed validation; all problems are collected in one error
    #[error("invalid rule '{id}': {}", problems.join("; "))]
    Invalid { id: String, problems: Vec<String> },
}

/// An audit rule: a named, weighted, categorized check over one page.
#[derive(Debug, Clone)]
pub struct RuleDef {
    /// Unique, stable identifier (e.g. "seo-title-present")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Detailed description
    pub description: String,

    /// Category tag (e.g. "seo", "a11y", "security")
    pub category: String,

    /// Weight in [0,100] for category-level aggregation
    pub weight: f64,

    /// Executable check body. `None` only on unvalidated candidates.
    pub check: Option<Check>,

    /// Deadline for checks that do their own I/O. A missed deadline
    /// resolves to a non-fatal result instead of stalling the audit.
    /// Stateless checks only; the deadline runs the body on its own
    /// thread, which cannot borrow the session mutably, so validation
    /// rejects a timeout on a stateful rule.
    pub timeout: Option<Duration>,
}

impl RuleDef {
    /// Create a rule candidate with default weight 1.0 and no check body.
    /// Attach a body with [`stateless`](Self::stateless) or
    /// [`stateful`](Self::stateful), then validate via registration.
    pub fn new(id: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            description: String::new(),
            category: category.to_string(),
            weight: 1.0,
            check: None,
            timeout: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the aggregation weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set a deadline for the check body. Only valid on stateless rules;
    /// see the [`timeout`](Self::timeout) field.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a stateless check body
    pub fn stateless<F>(mut self, f: F) -> Self
    where
        F: Fn(&PageContext) -> RuleResult + Send + Sync + 'static,
    {
        self.check = Some(Check::Stateless(Arc::new(f)));
        self
    }

    /// Attach a stateful (cross-page) check body
    pub fn stateful<F>(mut self, f: F) -> Self
    where
        F: Fn(&PageContext, &mut CrawlSession) -> RuleResult + Send + Sync + 'static,
    {
        self.check = Some(Check::Stateful(Arc::new(f)));
        self
    }

    /// Whether this rule's check mutates session state
    pub fn is_stateful(&self) -> bool {
        self.check.as_ref().is_some_and(Check::is_stateful)
    }

    /// Validate this rule, collecting every problem instead of stopping at
    /// the first. Rule authors commonly miss several fields at once and
    /// should see the complete list in one pass.
    pub fn validate(&self) -> Result<(), RuleError> {
        let mut problems = Vec::new();

        if self.id.trim().is_empty() {
            problems.push("id must be a non-empty string".to_string());
        }
        if self.name.trim().is_empty() {
            problems.push("name is required".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("description is required".to_string());
        }
        if self.category.trim().is_empty() {
            problems.push("category is required".to_string());
        }
        if !self.weight.is_finite() || !WEIGHT_RANGE.contains(&self.weight) {
            problems.push(format!("weight {} is outside [0,100]", self.weight));
        }
        if self.check.is_none() {
            problems.push("check function is missing".to_string());
        }
        if self.timeout.is_some() && self.is_stateful() {
            problems.push("timeout is only supported on stateless checks".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RuleError::Invalid {
                id: self.id.clone(),
                problems,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_rule() -> RuleDef {
        RuleDef::new("test-rule", "seo")
            .with_name("Test rule")
            .with_description("A rule used in tests")
            .with_weight(5.0)
            .stateless(|_page| RuleResult::pass("test-rule", "ok"))
    }

    #[test]
    fn test_valid_rule_passes_validation() {
        assert!(valid_rule().validate().is_ok());
    }

    #[test]
    fn test_validation_collects_all_problems() {
        // Missing name, description, check body, and a bad weight: all
        // four problems must surface in one error.
        let rule = RuleDef::new("broken", "seo").with_weight(150.0);

        let err = rule.validate().unwrap_err();
        let RuleError::Invalid { id, problems } = err;
        assert_eq!(id, "broken");
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("name")));
        assert!(problems.iter().any(|p| p.contains("description")));
        assert!(problems.iter().any(|p| p.contains("weight")));
        assert!(problems.iter().any(|p| p.contains("check")));
    }

    #[test]
    fn test_validation_rejects_blank_id() {
        let rule = RuleDef {
            id: "   ".to_string(),
            ..valid_rule()
        };
        let RuleError::Invalid { problems, .. } = rule.validate().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("id"));
    }

    #[test]
    fn test_validation_rejects_nan_weight() {
        let rule = valid_rule().with_weight(f64::NAN);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_weight_boundaries_are_valid() {
        assert!(valid_rule().with_weight(0.0).validate().is_ok());
        assert!(valid_rule().with_weight(100.0).validate().is_ok());
        assert!(valid_rule().with_weight(100.1).validate().is_err());
    }

    #[test]
    fn test_stateful_flag() {
        assert!(!valid_rule().is_stateful());

        let rule = RuleDef::new("x", "seo")
            .with_name("x")
            .with_description("x")
            .stateful(|_page, _session| RuleResult::pass("x", "ok"));
        assert!(rule.is_stateful());
    }

    #[test]
    fn test_validation_rejects_timeout_on_stateful() {
        let rule = RuleDef::new("x", "seo")
            .with_name("x")
            .with_description("x")
            .with_timeout(Duration::from_secs(1))
            .stateful(|_page, _session| RuleResult::pass("x", "ok"));

        let RuleError::Invalid { problems, .. } = rule.validate().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("timeout"));

        // Same deadline on a stateless rule is fine
        let rule = valid_rule().with_timeout(Duration::from_secs(1));
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_error_message_joins_problems() {
        let err = RuleDef::new("broken", "seo").validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("invalid rule 'broken':"));
        assert!(msg.contains("; "));
    }
}
