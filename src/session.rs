//! Crawl session state
//!
//! One [`CrawlSession`] exists per independent crawl and owns the two
//! cross-page registries. It is constructed by (or handed to) the
//! orchestrator and injected into every stateful rule invocation; nothing
//! here is a module-level singleton, so sessions never leak state into
//! each other.
//!
//! Reusing a session across independent crawls without [`reset`] is a
//! contract violation: it does not crash, it silently produces duplicate
//! warnings against pages from the previous crawl.
//!
//! [`reset`]: CrawlSession::reset

use crate::analyzers::content::{ContentStats, NearDuplicateRegistry};
use crate::analyzers::title::{TitleRegistry, TitleStats};
use serde::Serialize;

/// Combined analyzer stats for introspection and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Title registry stats
    pub titles: TitleStats,
    /// Near-duplicate registry stats
    pub content: ContentStats,
}

/// Shared, mutable per-crawl state for the stateful analyzers.
#[derive(Debug, Default)]
pub struct CrawlSession {
    titles: TitleRegistry,
    content: NearDuplicateRegistry,
}

impl CrawlSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// The title-uniqueness registry
    pub fn titles(&mut self) -> &mut TitleRegistry {
        &mut self.titles
    }

    /// The near-duplicate content registry
    pub fn content(&mut self) -> &mut NearDuplicateRegistry {
        &mut self.content
    }

    /// Clear both registries. Must run before a session is reused for a
    /// new independent crawl; registries never expire on their own.
    pub fn reset(&mut self) {
        self.titles.reset();
        self.content.reset();
    }

    /// Snapshot of both registries' stats
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            titles: self.titles.stats(),
            content: self.content.stats(),
        }
    }
}
