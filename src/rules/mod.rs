//! Built-in audit rules
//!
//! Rules live in a declarative manifest assembled once at startup and
//! handed to the registry; nothing self-registers at load time, so there
//! are no hidden ordering dependencies between modules.
//!
//! Each rule body is a small, independently testable predicate over the
//! page context. The two cross-page rules delegate to the session
//! analyzers.

pub mod a11y;
pub mod content;
pub mod security;
pub mod seo;

use crate::rule::RuleDef;

/// The complete built-in rule manifest, in audit order
pub fn builtin_rules() -> Vec<RuleDef> {
    let mut rules = Vec::new();
    rules.extend(seo::rules());
    rules.extend(content::rules());
    rules.extend(security::rules());
    rules.extend(a11y::rules());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Auditor;
    use crate::config::Config;
    use crate::page::PageContext;
    use crate::registry::RuleRegistry;
    use crate::result::Status;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_manifest_is_valid_and_unique() {
        // Every built-in rule must survive registration: valid fields,
        // no duplicate ids.
        let rules = builtin_rules();
        assert!(!rules.is_empty());

        let ids: HashSet<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), rules.len());

        let registry = RuleRegistry::from_rules(builtin_rules()).unwrap();
        assert_eq!(registry.len(), rules.len());
    }

    #[test]
    fn test_manifest_categories() {
        let registry = RuleRegistry::from_rules(builtin_rules()).unwrap();
        assert_eq!(
            registry.categories(),
            vec!["a11y", "content", "security", "seo"]
        );
    }

    fn crawl_page(url: &str, title: &str, body: &str) -> PageContext {
        let html = format!(
            r#"<html lang="en"><head><title>{}</title><link rel="canonical" href="{}"><meta name="description" content="A reasonably descriptive summary of this page, long enough to satisfy length checks."></head><body><h1>Heading</h1><p>{}</p></body></html>"#,
            title, url, body
        );
        PageContext::from_static_html(url, &html).with_status(200)
    }

    fn paragraph(seed: &str) -> String {
        (0..80).map(|i| format!("{} topic{} detail ", seed, i)).collect()
    }

    #[test]
    fn test_three_page_crawl_flags_duplicates() {
        let mut config = Config::new();
        config.engine.parallel = false;
        let auditor = Auditor::new(
            config,
            RuleRegistry::from_rules(builtin_rules()).unwrap(),
        );

        let home_body = paragraph("anvils");
        let pages = [
            crawl_page("https://acme.test/", "Home | Acme", &home_body),
            // Same body under a different title
            crawl_page("https://acme.test/copy", "Copy | Acme", &home_body),
            // Different body under a title that normalizes to the home title
            crawl_page("https://acme.test/spaced", "home   |   acme", &paragraph("rockets")),
        ];

        let result = auditor.audit_session(&pages);
        assert_eq!(result.pages.len(), 3);

        // Page 1 is the original on both axes
        let first = &result.pages[0];
        assert_eq!(first.result("seo-title-unique").unwrap().status, Status::Pass);
        assert_eq!(
            first.result("content-near-duplicate").unwrap().status,
            Status::Pass
        );

        // Page 2: verbatim body copy fails against page 1
        let copy = result.pages[1].result("content-near-duplicate").unwrap();
        assert_eq!(copy.status, Status::Fail);
        assert_eq!(copy.details.as_ref().unwrap()["url"], "https://acme.test/");

        // Page 3: normalized title collision warns and names both URLs
        // in visit order
        let spaced = result.pages[2].result("seo-title-unique").unwrap();
        assert_eq!(spaced.status, Status::Warn);
        assert_eq!(
            spaced.details.as_ref().unwrap()["urls"],
            serde_json::json!(["https://acme.test/", "https://acme.test/spaced"])
        );
        assert_eq!(
            result.pages[2].result("content-near-duplicate").unwrap().status,
            Status::Pass
        );
    }

    #[test]
    fn test_category_disable_beats_enable() {
        let mut config = Config::new();
        config.engine.parallel = false;
        config.rules.enable = vec!["seo/*".to_string()];
        config.rules.disable = vec!["seo-canonical-link".to_string()];
        let auditor = Auditor::new(
            config,
            RuleRegistry::from_rules(builtin_rules()).unwrap(),
        );

        let result = auditor.audit_session(&[crawl_page(
            "https://acme.test/",
            "Home | Acme",
            &paragraph("anvils"),
        )]);

        let audit = &result.pages[0];
        assert!(audit.result("seo-title-present").is_some());
        assert!(audit.result("seo-canonical-link").is_none());
        assert!(audit.result("security-https").is_none());
    }

    #[test]
    fn test_manifest_has_exactly_two_stateful_rules() {
        let stateful: Vec<String> = builtin_rules()
            .iter()
            .filter(|r| r.is_stateful())
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(stateful, vec!["seo-title-unique", "content-near-duplicate"]);
    }
}
