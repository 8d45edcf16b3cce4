//! SEO rules

use crate::analyzers::title::TitleOutcome;
use crate::result::RuleResult;
use crate::rule::RuleDef;
use serde_json::json;

/// Recommended title length range, characters
const TITLE_LENGTH: std::ops::RangeInclusive<usize> = 10..=60;

/// Recommended meta description length range, characters
const DESCRIPTION_LENGTH: std::ops::RangeInclusive<usize> = 50..=160;

pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new("seo-title-present", "seo")
            .with_name("Title tag present")
            .with_description("Every page should have a non-empty <title> element")
            .with_weight(10.0)
            .stateless(|page| match page.dom().title() {
                Some(title) if !title.trim().is_empty() => {
                    RuleResult::pass("seo-title-present", "page has a title")
                }
                _ => RuleResult::fail("seo-title-present", "page has no title tag"),
            }),
        RuleDef::new("seo-title-length", "seo")
            .with_name("Title length")
            .with_description("Titles between 10 and 60 characters display fully in search results")
            .with_weight(5.0)
            .stateless(|page| {
                let Some(title) = page.dom().title() else {
                    return RuleResult::warn("seo-title-length", "no title to measure");
                };
                let len = title.trim().chars().count();
                if TITLE_LENGTH.contains(&len) {
                    RuleResult::pass(
                        "seo-title-length",
                        &format!("title length {} is in range", len),
                    )
                } else {
                    RuleResult::warn(
                        "seo-title-length",
                        &format!("title length {} is outside {}-{}", len, 10, 60),
                    )
                    .with_details(json!({ "length": len }))
                }
            }),
        RuleDef::new("seo-title-unique", "seo")
            .with_name("Title unique across crawl")
            .with_description("Pages sharing a title compete with each other in search results")
            .with_weight(8.0)
            .stateful(|page, session| {
                let title = page.dom().title();
                match session.titles().record(&page.url, title.as_deref()) {
                    TitleOutcome::Missing => {
                        RuleResult::fail("seo-title-unique", "page has no title tag")
                    }
                    TitleOutcome::Unique => {
                        RuleResult::pass("seo-title-unique", "title is unique so far")
                    }
                    TitleOutcome::Duplicate { urls } => RuleResult::warn(
                        "seo-title-unique",
                        &format!("title is shared by {} pages", urls.len()),
                    )
                    .with_details(json!({ "urls": urls })),
                }
            }),
        RuleDef::new("seo-meta-description", "seo")
            .with_name("Meta description present")
            .with_description("Search engines use the meta description as the result snippet")
            .with_weight(8.0)
            .stateless(|page| {
                match page.dom().first_attr("meta[name=description]", "content") {
                    Some(content) if !content.trim().is_empty() => {
                        RuleResult::pass("seo-meta-description", "meta description present")
                    }
                    _ => RuleResult::fail("seo-meta-description", "no meta description"),
                }
            }),
        RuleDef::new("seo-meta-description-length", "seo")
            .with_name("Meta description length")
            .with_description(
                "Descriptions between 50 and 160 characters avoid truncation in snippets",
            )
            .with_weight(4.0)
            .stateless(|page| {
                let content = page
                    .dom()
                    .first_attr("meta[name=description]", "content")
                    .unwrap_or_default();
                let len = content.trim().chars().count();
                if len == 0 {
                    // seo-meta-description already fails outright
                    RuleResult::warn("seo-meta-description-length", "no meta description to measure")
                } else if DESCRIPTION_LENGTH.contains(&len) {
                    RuleResult::pass(
                        "seo-meta-description-length",
                        &format!("description length {} is in range", len),
                    )
                } else {
                    RuleResult::warn(
                        "seo-meta-description-length",
                        &format!("description length {} is outside {}-{}", len, 50, 160),
                    )
                    .with_details(json!({ "length": len }))
                }
            }),
        RuleDef::new("seo-h1-present", "seo")
            .with_name("Single H1 heading")
            .with_description("Each page should have exactly one <h1>")
            .with_weight(6.0)
            .stateless(|page| match page.dom().count("h1") {
                1 => RuleResult::pass("seo-h1-present", "page has one h1"),
                0 => RuleResult::fail("seo-h1-present", "page has no h1"),
                n => RuleResult::warn("seo-h1-present", &format!("page has {} h1 elements", n))
                    .with_details(json!({ "count": n })),
            }),
        RuleDef::new("seo-canonical-link", "seo")
            .with_name("Canonical link present")
            .with_description("A canonical link prevents duplicate-URL indexing")
            .with_weight(4.0)
            .stateless(|page| {
                if page.dom().exists("link[rel=canonical]") {
                    RuleResult::pass("seo-canonical-link", "canonical link present")
                } else {
                    RuleResult::warn("seo-canonical-link", "no canonical link")
                }
            }),
        RuleDef::new("seo-status-ok", "seo")
            .with_name("Successful HTTP status")
            .with_description("Indexed pages should respond with a 2xx or 3xx status")
            .with_weight(10.0)
            .stateless(|page| {
                if (200..400).contains(&page.status_code) {
                    RuleResult::pass(
                        "seo-status-ok",
                        &format!("status {} is successful", page.status_code),
                    )
                } else {
                    RuleResult::fail(
                        "seo-status-ok",
                        &format!("status {} is an error", page.status_code),
                    )
                }
            }),
    ]
}
