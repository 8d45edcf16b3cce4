//! Pageaudit - Web Page Audit Rule Engine
//!
//! A fast, modular audit framework for crawled web pages. Rules grade each
//! page pass/warn/fail across categories such as SEO, content quality,
//! security, and accessibility, and the results roll up into weighted
//! category and overall scores.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Auditor -> RuleRegistry -> RuleDef -> PageContext
//!                   \-> CrawlSession (cross-page analyzers)
//! ```
//!
//! The auditor filters the registry through enable/disable patterns, runs
//! stateless rules in parallel per page, runs stateful rules sequentially
//! in crawl order against the shared [`session::CrawlSession`], and
//! aggregates everything into per-category and per-page scores.
//!
//! # Defining Rules
//!
//! ```
//! use pageaudit::result::RuleResult;
//! use pageaudit::rule::RuleDef;
//!
//! let rule = RuleDef::new("seo-title-present", "seo")
//!     .with_name("Title present")
//!     .with_description("Every page needs a title element")
//!     .with_weight(10.0)
//!     .stateless(|page| match page.dom().title() {
//!         Some(_) => RuleResult::pass("seo-title-present", "title present"),
//!         None => RuleResult::fail("seo-title-present", "missing title"),
//!     });
//! assert!(rule.validate().is_ok());
//! ```

pub mod analyzers;
pub mod audit;
pub mod config;
pub mod matcher;
pub mod output;
pub mod page;
pub mod registry;
pub mod result;
pub mod rule;
pub mod rules;
pub mod session;

// Re-export main types
pub use analyzers::content::{ContentOutcome, NearDuplicateRegistry};
pub use analyzers::title::{TitleOutcome, TitleRegistry};
pub use audit::{AuditResult, Auditor, CategoryResult, RuleTiming, SessionResult};
pub use config::{ColorMode, Config, OutputFormat};
pub use matcher::Pattern;
pub use output::{JsonFormatter, OutputFormatter, TextFormatter};
pub use page::{Dom, PageContext, StaticDom};
pub use registry::{RegistryError, RuleRegistry};
pub use result::{RuleResult, Status};
pub use rule::{Check, RuleDef, RuleError};
pub use session::{CrawlSession, SessionStats};
