//! Cross-page stateful analyzers
//!
//! Both analyzers accumulate data across a crawl session and must be
//! reset before an independent crawl reuses them. [`crate::session::CrawlSession`]
//! owns their lifecycle; rule executions only read and append.

pub mod content;
pub mod title;

pub use content::{ContentOutcome, NearDuplicateRegistry};
pub use title::{TitleOutcome, TitleRegistry};
