//! Core audit orchestrator
//!
//! For each crawled page the auditor resolves the active rule set,
//! executes every active rule against the page context, and aggregates
//! results into category and overall scores. Stateless rules run in
//! parallel; stateful rules run strictly sequentially in crawl-discovery
//! order so the earliest-crawled page is always "the original" in
//! duplicate reports. All shared mutation is confined to the session's
//! two registries; no rule can touch another rule's result.

use crate::config::Config;
use crate::matcher::filter_rules;
use crate::page::PageContext;
use crate::registry::RuleRegistry;
use crate::result::RuleResult;
use crate::rule::{Check, RuleDef, StatelessCheck};
use crate::session::{CrawlSession, SessionStats};
use chrono::{DateTime, Utc};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Per-rule timing statistics
#[derive(Debug, Clone, Default)]
pub struct RuleTiming {
    /// Rule ID
    pub rule_id: String,
    /// Total time spent on this rule
    pub total_time: Duration,
    /// Number of times the rule was executed
    pub evaluation_count: usize,
    /// Number of non-pass outcomes
    pub flagged_count: usize,
}

impl RuleTiming {
    /// Create a new timing entry
    pub fn new(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            ..Default::default()
        }
    }

    /// Average time per execution
    pub fn avg_time(&self) -> Duration {
        if self.evaluation_count > 0 {
            self.total_time / self.evaluation_count as u32
        } else {
            Duration::ZERO
        }
    }
}

/// Rollup of all results sharing a category, for one page
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    /// Category tag
    pub category: String,
    /// Weight-adjusted score in [0,100]
    pub score: f64,
    pub pass_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
    /// Individual rule results, in execution order
    pub results: Vec<RuleResult>,
}

/// Rollup of all category results for one page
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    /// Page URL
    pub url: String,
    /// When the audit of this page completed
    pub timestamp: DateTime<Utc>,
    /// Mean of the category scores (100.0 when nothing executed)
    pub overall_score: f64,
    /// Per-category rollups, sorted by category name
    pub categories: Vec<CategoryResult>,
}

impl AuditResult {
    /// Look up a single rule's result by id
    pub fn result(&self, rule_id: &str) -> Option<&RuleResult> {
        self.categories
            .iter()
            .flat_map(|c| c.results.iter())
            .find(|r| r.rule_id == rule_id)
    }

    pub fn pass_count(&self) -> usize {
        self.categories.iter().map(|c| c.pass_count).sum()
    }

    pub fn warn_count(&self) -> usize {
        self.categories.iter().map(|c| c.warn_count).sum()
    }

    pub fn fail_count(&self) -> usize {
        self.categories.iter().map(|c| c.fail_count).sum()
    }
}

/// Result of auditing one crawl session
#[derive(Debug, Default)]
pub struct SessionResult {
    /// Per-page audit results, in crawl order
    pub pages: Vec<AuditResult>,

    /// Pages beyond the configured maximum that were not audited
    pub pages_skipped: usize,

    /// Total processing duration
    pub duration: Duration,

    /// Per-rule timing statistics (rule_id -> timing)
    pub rule_timings: HashMap<String, RuleTiming>,

    /// Final analyzer stats for the session
    pub stats: Option<SessionStats>,
}

impl SessionResult {
    pub fn pass_count(&self) -> usize {
        self.pages.iter().map(AuditResult::pass_count).sum()
    }

    pub fn warn_count(&self) -> usize {
        self.pages.iter().map(AuditResult::warn_count).sum()
    }

    pub fn fail_count(&self) -> usize {
        self.pages.iter().map(AuditResult::fail_count).sum()
    }

    /// Check if result is clean (no warns or fails)
    pub fn is_clean(&self) -> bool {
        self.warn_count() == 0 && self.fail_count() == 0
    }

    /// Get exit code (0 = clean, 1 = warnings, 2 = failures)
    pub fn exit_code(&self) -> i32 {
        if self.fail_count() > 0 {
            2
        } else if self.warn_count() > 0 {
            1
        } else {
            0
        }
    }

    /// Mean overall score across pages
    pub fn average_score(&self) -> f64 {
        if self.pages.is_empty() {
            return 100.0;
        }
        self.pages.iter().map(|p| p.overall_score).sum::<f64>() / self.pages.len() as f64
    }

    /// Get rule timings sorted by total time (descending)
    pub fn sorted_timings(&self) -> Vec<&RuleTiming> {
        let mut timings: Vec<_> = self.rule_timings.values().collect();
        timings.sort_by(|a, b| b.total_time.cmp(&a.total_time));
        timings
    }

    /// Format timing statistics as a string
    pub fn format_timings(&self) -> String {
        let timings = self.sorted_timings();
        if timings.is_empty() {
            return "No timing data available".to_string();
        }

        let mut output = String::new();
        output.push_str("Rule Timing Statistics:\n");
        output.push_str(&format!(
            "{:<40} {:>12} {:>12} {:>10} {:>10}\n",
            "Rule ID", "Total", "Avg", "Evals", "Flagged"
        ));
        output.push_str(&"-".repeat(88));
        output.push('\n');

        for timing in timings {
            let total_ms = timing.total_time.as_secs_f64() * 1000.0;
            let avg_us = timing.avg_time().as_secs_f64() * 1_000_000.0;
            output.push_str(&format!(
                "{:<40} {:>10.2}ms {:>10.2}µs {:>10} {:>10}\n",
                timing.rule_id, total_ms, avg_us, timing.evaluation_count, timing.flagged_count
            ));
        }

        output
    }
}

/// The audit orchestrator
pub struct Auditor {
    config: Config,
    registry: RuleRegistry,
}

impl Auditor {
    /// Create an auditor over a registry of validated rules
    pub fn new(config: Config, registry: RuleRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Audit one independent crawl with a fresh session.
    pub fn audit_session(&self, pages: &[PageContext]) -> SessionResult {
        let mut session = CrawlSession::new();
        self.audit_session_with(&mut session, pages)
    }

    /// Audit one independent crawl reusing a caller-owned session.
    ///
    /// The session is reset at the start; it is never reset mid-session,
    /// so cancellation (fewer pages than planned) leaves valid state.
    pub fn audit_session_with(
        &self,
        session: &mut CrawlSession,
        pages: &[PageContext],
    ) -> SessionResult {
        let start = Instant::now();
        session.reset();

        let pool = if self.config.engine.parallel {
            rayon::ThreadPoolBuilder::new()
                .num_threads(if self.config.engine.jobs > 0 {
                    self.config.engine.jobs
                } else {
                    num_cpus::get()
                })
                .build()
                .ok()
        } else {
            None
        };

        let limit = self.config.engine.max_pages;
        let mut result = SessionResult {
            pages_skipped: pages.len().saturating_sub(limit),
            ..SessionResult::default()
        };

        for page in pages.iter().take(limit) {
            let audited = self.audit_page_inner(session, page, pool.as_ref(), &mut result.rule_timings);
            result.pages.push(audited);
        }

        result.stats = Some(session.stats());
        result.duration = start.elapsed();
        result
    }

    /// Audit a single page against a caller-owned session.
    ///
    /// Useful for drivers that interleave fetching and auditing; such
    /// callers own the session lifecycle and must reset it themselves
    /// between independent crawls.
    pub fn audit_page(&self, session: &mut CrawlSession, page: &PageContext) -> AuditResult {
        let mut timings = HashMap::new();
        self.audit_page_inner(session, page, None, &mut timings)
    }

    fn audit_page_inner(
        &self,
        session: &mut CrawlSession,
        page: &PageContext,
        pool: Option<&rayon::ThreadPool>,
        timings: &mut HashMap<String, RuleTiming>,
    ) -> AuditResult {
        let active: Vec<&RuleDef> = filter_rules(
            self.registry.all(),
            &self.config.rules.enable,
            &self.config.rules.disable,
        )
        .into_iter()
        .filter(|rule| !self.config.should_ignore_rule_for_url(&rule.id, &page.url))
        .collect();

        let (stateful, stateless): (Vec<&RuleDef>, Vec<&RuleDef>) =
            active.into_iter().partition(|rule| rule.is_stateful());

        debug!(
            "auditing {}: {} stateless, {} stateful rules",
            page.url,
            stateless.len(),
            stateful.len()
        );

        // Stateless partition: independent across rules and pages.
        let stateless_results: Vec<(RuleResult, Duration)> = match pool {
            Some(pool) => pool.install(|| {
                stateless
                    .par_iter()
                    .map(|rule| self.execute_stateless(rule, page))
                    .collect()
            }),
            None => stateless
                .iter()
                .map(|rule| self.execute_stateless(rule, page))
                .collect(),
        };

        let mut results = Vec::with_capacity(stateless.len() + stateful.len());
        for (rule, (result, elapsed)) in stateless.iter().zip(stateless_results) {
            record_timing(timings, &rule.id, &result, elapsed);
            results.push(result);
        }

        // Stateful partition: strictly sequential, committing registry
        // mutations before the next page can observe them.
        for rule in &stateful {
            let start = Instant::now();
            let result = self.execute_stateful(rule, page, session);
            record_timing(timings, &rule.id, &result, start.elapsed());
            results.push(result);
        }

        self.aggregate(&page.url, results)
    }

    fn execute_stateless(&self, rule: &RuleDef, page: &PageContext) -> (RuleResult, Duration) {
        let start = Instant::now();
        let result = match &rule.check {
            Some(Check::Stateless(check)) => match rule.timeout {
                Some(deadline) => run_with_deadline(&rule.id, check, page, deadline),
                None => run_guarded(&rule.id, || check(page)),
            },
            // Unreachable after validation and partitioning
            _ => RuleResult::fail(&rule.id, "rule has no runnable stateless check"),
        };
        (result, start.elapsed())
    }

    fn execute_stateful(
        &self,
        rule: &RuleDef,
        page: &PageContext,
        session: &mut CrawlSession,
    ) -> RuleResult {
        match &rule.check {
            // No deadline handling here: validation rejects a timeout on
            // a stateful rule, since the deadline thread cannot borrow
            // the session mutably.
            //
            // A panic mid-mutation can leave a partial append in the
            // session; the registries are forward-only accumulators, so
            // partial state is still valid.
            Some(Check::Stateful(check)) => run_guarded(&rule.id, || check(page, session)),
            _ => RuleResult::fail(&rule.id, "rule has no runnable stateful check"),
        }
    }

    fn aggregate(&self, url: &str, results: Vec<RuleResult>) -> AuditResult {
        let mut by_category: BTreeMap<String, Vec<(f64, RuleResult)>> = BTreeMap::new();
        for result in results {
            let (category, weight) = match self.registry.get(&result.rule_id) {
                Some(rule) => (rule.category.clone(), rule.weight),
                None => ("uncategorized".to_string(), 1.0),
            };
            by_category.entry(category).or_default().push((weight, result));
        }

        let categories: Vec<CategoryResult> = by_category
            .into_iter()
            .map(|(category, rows)| {
                let total_weight: f64 = rows.iter().map(|(w, _)| *w).sum();
                let score = if total_weight > 0.0 {
                    rows.iter().map(|(w, r)| w * r.score).sum::<f64>() / total_weight
                } else {
                    // All-zero weights: fall back to the unweighted mean
                    rows.iter().map(|(_, r)| r.score).sum::<f64>() / rows.len() as f64
                };

                let pass_count = rows.iter().filter(|(_, r)| r.is_pass()).count();
                let warn_count = rows.iter().filter(|(_, r)| r.is_warn()).count();
                let fail_count = rows.iter().filter(|(_, r)| r.is_fail()).count();

                CategoryResult {
                    category,
                    score,
                    pass_count,
                    warn_count,
                    fail_count,
                    results: rows.into_iter().map(|(_, r)| r).collect(),
                }
            })
            .collect();

        let overall_score = if categories.is_empty() {
            100.0
        } else {
            categories.iter().map(|c| c.score).sum::<f64>() / categories.len() as f64
        };

        AuditResult {
            url: url.to_string(),
            timestamp: Utc::now(),
            overall_score,
            categories,
        }
    }
}

fn record_timing(
    timings: &mut HashMap<String, RuleTiming>,
    rule_id: &str,
    result: &RuleResult,
    elapsed: Duration,
) {
    let timing = timings
        .entry(rule_id.to_string())
        .or_insert_with(|| RuleTiming::new(rule_id));
    timing.total_time += elapsed;
    timing.evaluation_count += 1;
    if !result.is_pass() {
        timing.flagged_count += 1;
    }
}

/// Run a check body, converting a panic into a fail result so one broken
/// check cannot abort the audit.
fn run_guarded<F>(rule_id: &str, f: F) -> RuleResult
where
    F: FnOnce() -> RuleResult,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => RuleResult::fail(
            rule_id,
            &format!("check panicked: {}", panic_message(payload.as_ref())),
        ),
    }
}

/// Run a stateless check with a deadline. A check that misses its
/// deadline resolves to a non-fatal pass-with-note instead of stalling
/// the audit; the worker thread runs to completion and its late result
/// is dropped when the channel closes.
fn run_with_deadline(
    rule_id: &str,
    check: &StatelessCheck,
    page: &PageContext,
    deadline: Duration,
) -> RuleResult {
    let (tx, rx) = mpsc::channel();
    let check = Arc::clone(check);
    let page = page.clone();
    std::thread::spawn(move || {
        let outcome = catch_unwind(AssertUnwindSafe(|| check(&page)));
        let _ = tx.send(outcome);
    });

    match rx.recv_timeout(deadline) {
        Ok(Ok(result)) => result,
        Ok(Err(payload)) => RuleResult::fail(
            rule_id,
            &format!("check panicked: {}", panic_message(payload.as_ref())),
        ),
        Err(_) => RuleResult::pass(
            rule_id,
            &format!("check did not complete within {:?}, skipped", deadline),
        ),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
