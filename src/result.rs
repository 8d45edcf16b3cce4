//! Result types for rule outcomes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome status of a single rule check
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Check passed
    #[default]
    Pass,
    /// Check found a potential issue
    Warn,
    /// Check found a definite problem
    Fail,
}

impl Status {
    /// Fixed score for this status: pass=100, warn=50, fail=0.
    /// There is no partial credit.
    pub const fn score(self) -> f64 {
        match self {
            Status::Pass => 100.0,
            Status::Warn => 50.0,
            Status::Fail => 0.0,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Warn => write!(f, "warn"),
            Status::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" | "ok" => Ok(Status::Pass),
            "warn" | "warning" => Ok(Status::Warn),
            "fail" | "error" => Ok(Status::Fail),
            _ => Err(()),
        }
    }
}

/// The outcome of one rule execution against one page.
///
/// The score is fully determined by the status. `details` is serialized
/// only when the rule supplied one; absence signals "no extra detail".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    /// Rule that produced this result
    pub rule_id: String,
    /// Outcome status
    pub status: Status,
    /// Fixed score derived from the status
    pub score: f64,
    /// Human-readable message
    pub message: String,
    /// Optional free-form payload with supporting data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RuleResult {
    fn with_status(rule_id: &str, status: Status, message: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            status,
            score: status.score(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a passing result (score 100)
    pub fn pass(rule_id: &str, message: &str) -> Self {
        Self::with_status(rule_id, Status::Pass, message)
    }

    /// Create a warning result (score 50)
    pub fn warn(rule_id: &str, message: &str) -> Self {
        Self::with_status(rule_id, Status::Warn, message)
    }

    /// Create a failing result (score 0)
    pub fn fail(rule_id: &str, message: &str) -> Self {
        Self::with_status(rule_id, Status::Fail, message)
    }

    /// Attach a free-form details payload
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Check if this result passed
    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }

    /// Check if this result is a warning
    pub fn is_warn(&self) -> bool {
        self.status == Status::Warn
    }

    /// Check if this result failed
    pub fn is_fail(&self) -> bool {
        self.status == Status::Fail
    }
}
