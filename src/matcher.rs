//! Pattern matching for rule enable/disable lists
//!
//! Resolves a configuration's `enable` and `disable` pattern lists into a
//! concrete active rule set. Pure and stateless: the same registry and the
//! same two lists always produce the same set.

use crate::rule::RuleDef;

/// One enable/disable pattern.
///
/// Three forms are supported: the universal wildcard `*`, a category
/// wildcard `<category>/*`, and an exact rule identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `*`, matching every rule
    All,
    /// `<category>/*`, matching every rule in the category
    Category(String),
    /// Exact rule identifier
    Exact(String),
}

impl Pattern {
    /// Parse a pattern string. Anything that is not `*` or `<cat>/*` is
    /// treated as an exact identifier.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s == "*" {
            Pattern::All
        } else if let Some(category) = s.strip_suffix("/*") {
            Pattern::Category(category.to_string())
        } else {
            Pattern::Exact(s.to_string())
        }
    }

    /// Whether this pattern matches a rule
    pub fn matches(&self, rule: &RuleDef) -> bool {
        match self {
            Pattern::All => true,
            Pattern::Category(category) => rule.category == *category,
            Pattern::Exact(id) => rule.id == *id,
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::All => write!(f, "*"),
            Pattern::Category(category) => write!(f, "{}/*", category),
            Pattern::Exact(id) => write!(f, "{}", id),
        }
    }
}

/// Whether a rule is active under the given lists: it must match at least
/// one enable pattern and no disable pattern. Disable always takes
/// precedence over enable, regardless of specificity.
pub fn is_active(rule: &RuleDef, enable: &[Pattern], disable: &[Pattern]) -> bool {
    if disable.iter().any(|p| p.matches(rule)) {
        return false;
    }
    enable.iter().any(|p| p.matches(rule))
}

/// Resolve the active subset of `rules`, preserving registry order.
pub fn filter_rules<'a>(
    rules: &'a [RuleDef],
    enable: &[String],
    disable: &[String],
) -> Vec<&'a RuleDef> {
    let enable: Vec<Pattern> = enable.iter().map(|s| Pattern::parse(s)).collect();
    let disable: Vec<Pattern> = disable.iter().map(|s| Pattern::parse(s)).collect();

    rules
        .iter()
        .filter(|rule| is_active(rule, &enable, &disable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::RuleResult;

    fn rule(id: &str, category: &str) -> RuleDef {
        let owned = id.to_string();
        RuleDef::new(id, category)
            .with_name(id)
            .with_description("matcher test rule")
            .stateless(move |_page| RuleResult::pass(&owned, "ok"))
    }

    fn sample_rules() -> Vec<RuleDef> {
        vec![
            rule("core-title-present", "core"),
            rule("core-meta-description", "core"),
            rule("a11y-img-alt", "a11y"),
        ]
    }

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pattern_parse() {
        assert_eq!(Pattern::parse("*"), Pattern::All);
        assert_eq!(Pattern::parse("core/*"), Pattern::Category("core".into()));
        assert_eq!(
            Pattern::parse("core-title-present"),
            Pattern::Exact("core-title-present".into())
        );
    }

    #[test]
    fn test_wildcard_enables_everything() {
        let rules = sample_rules();
        let active = filter_rules(&rules, &strs(&["*"]), &[]);
        assert_eq!(active.len(), 3);
    }

    #[test]
    fn test_empty_enable_activates_nothing() {
        let rules = sample_rules();
        assert!(filter_rules(&rules, &[], &[]).is_empty());
    }

    #[test]
    fn test_category_wildcard() {
        let rules = sample_rules();
        let active = filter_rules(&rules, &strs(&["core/*"]), &[]);
        let ids: Vec<&str> = active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["core-title-present", "core-meta-description"]);
    }

    #[test]
    fn test_exact_id() {
        let rules = sample_rules();
        let active = filter_rules(&rules, &strs(&["a11y-img-alt"]), &[]);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a11y-img-alt");
    }

    #[test]
    fn test_disable_beats_enable() {
        // core-title-present matches the category enable, but the exact
        // disable wins regardless of specificity.
        let rules = sample_rules();
        let active = filter_rules(
            &rules,
            &strs(&["core/*"]),
            &strs(&["core-title-present"]),
        );
        let ids: Vec<&str> = active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["core-meta-description"]);
    }

    #[test]
    fn test_disable_wildcard_disables_everything() {
        let rules = sample_rules();
        assert!(filter_rules(&rules, &strs(&["*"]), &strs(&["*"])).is_empty());
    }

    #[test]
    fn test_disable_category_beats_exact_enable() {
        let rules = sample_rules();
        let active = filter_rules(
            &rules,
            &strs(&["core-title-present"]),
            &strs(&["core/*"]),
        );
        assert!(active.is_empty());
    }

    #[test]
    fn test_registry_order_preserved() {
        let rules = sample_rules();
        let active = filter_rules(&rules, &strs(&["a11y-img-alt", "core/*"]), &[]);
        // Output follows registry order, not pattern-list order
        let ids: Vec<&str> = active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["core-title-present", "core-meta-description", "a11y-img-alt"]
        );
    }

    #[test]
    fn test_deterministic() {
        let rules = sample_rules();
        let enable = strs(&["*"]);
        let disable = strs(&["a11y/*"]);
        let first: Vec<String> = filter_rules(&rules, &enable, &disable)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let second: Vec<String> = filter_rules(&rules, &enable, &disable)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(first, second);
    }
}
