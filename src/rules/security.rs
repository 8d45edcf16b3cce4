//! Transport and header security rules

use crate::result::RuleResult;
use crate::rule::RuleDef;
use serde_json::json;

pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new("security-https", "security")
            .with_name("Served over HTTPS")
            .with_description("Pages served over plain HTTP expose visitors to interception")
            .with_weight(10.0)
            .stateless(|page| {
                if page.url.starts_with("https://") {
                    RuleResult::pass("security-https", "page served over HTTPS")
                } else {
                    RuleResult::fail("security-https", "page not served over HTTPS")
                }
            }),
        RuleDef::new("security-hsts", "security")
            .with_name("HSTS header present")
            .with_description(
                "Strict-Transport-Security keeps returning visitors off plain HTTP",
            )
            .with_weight(5.0)
            .stateless(|page| match page.header("strict-transport-security") {
                Some(_) => RuleResult::pass("security-hsts", "HSTS header present"),
                None => RuleResult::warn("security-hsts", "Strict-Transport-Security header missing"),
            }),
        RuleDef::new("security-content-type-options", "security")
            .with_name("X-Content-Type-Options set")
            .with_description("nosniff stops browsers from second-guessing content types")
            .with_weight(4.0)
            .stateless(|page| {
                let nosniff = page
                    .header("x-content-type-options")
                    .is_some_and(|v| v.eq_ignore_ascii_case("nosniff"));
                if nosniff {
                    RuleResult::pass(
                        "security-content-type-options",
                        "X-Content-Type-Options is nosniff",
                    )
                } else {
                    RuleResult::warn(
                        "security-content-type-options",
                        "X-Content-Type-Options header missing or not nosniff",
                    )
                }
            }),
        RuleDef::new("security-mixed-content", "security")
            .with_name("No mixed content")
            .with_description(
                "HTTPS pages loading http:// subresources break the padlock and may be blocked",
            )
            .with_weight(8.0)
            .stateless(|page| {
                if !page.url.starts_with("https://") {
                    return RuleResult::pass(
                        "security-mixed-content",
                        "page is not HTTPS, mixed content not applicable",
                    );
                }
                let insecure = insecure_references(&page.html);
                if insecure.is_empty() {
                    RuleResult::pass("security-mixed-content", "no insecure subresources")
                } else {
                    RuleResult::fail(
                        "security-mixed-content",
                        &format!("{} insecure subresource reference(s)", insecure.len()),
                    )
                    .with_details(json!({ "urls": insecure }))
                }
            }),
    ]
}

/// Collect `http://` URLs referenced from src/href attributes, in
/// document order. Attribute names match case-insensitively and values
/// may be double-quoted, single-quoted, or bare.
fn insecure_references(html: &str) -> Vec<String> {
    let pattern = r#"(?is)\b(?:src|href)\s*=\s*("(http://[^"]*)"|'(http://[^']*)'|(http://[^\s>]+))"#;
    let re = match regex::Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(html)
        .filter_map(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}
