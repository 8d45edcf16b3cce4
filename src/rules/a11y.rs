//! Accessibility rules

use crate::result::RuleResult;
use crate::rule::RuleDef;
use serde_json::json;

pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new("a11y-img-alt", "a11y")
            .with_name("Images have alt text")
            .with_description("Screen readers announce alt text in place of the image")
            .with_weight(7.0)
            .stateless(|page| {
                let total = page.dom().count("img");
                let with_alt = page.dom().count("img[alt]");
                let missing = total.saturating_sub(with_alt);
                if missing == 0 {
                    RuleResult::pass(
                        "a11y-img-alt",
                        &format!("all {} image(s) have alt attributes", total),
                    )
                } else {
                    RuleResult::warn(
                        "a11y-img-alt",
                        &format!("{} of {} image(s) missing alt attributes", missing, total),
                    )
                    .with_details(json!({ "total": total, "missing": missing }))
                }
            }),
        RuleDef::new("a11y-html-lang", "a11y")
            .with_name("Document language declared")
            .with_description("Assistive technology picks voice and hyphenation from the lang attribute")
            .with_weight(6.0)
            .stateless(|page| {
                if page.dom().exists("html[lang]") {
                    RuleResult::pass("a11y-html-lang", "html element declares a language")
                } else {
                    RuleResult::fail("a11y-html-lang", "html element has no lang attribute")
                }
            }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageContext;
    use crate::result::Status;
    use crate::rule::Check;

    fn run(rule_id: &str, page: &PageContext) -> RuleResult {
        let rules = rules();
        let rule = rules.iter().find(|r| r.id == rule_id).unwrap();
        match rule.check.as_ref().unwrap() {
            Check::Stateless(f) => f(page),
            Check::Stateful(_) => panic!("stateful rule"),
        }
    }

    #[test]
    fn test_img_alt() {
        let good = PageContext::from_static_html(
            "u",
            r#"<body><img src="a.png" alt="a"><img src="b.png" alt=""></body>"#,
        );
        assert_eq!(run("a11y-img-alt", &good).status, Status::Pass);

        let bad = PageContext::from_static_html(
            "u",
            r#"<body><img src="a.png" alt="a"><img src="b.png"><img src="c.png"></body>"#,
        );
        let result = run("a11y-img-alt", &bad);
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.details.as_ref().unwrap()["missing"], 2);
        assert_eq!(result.details.as_ref().unwrap()["total"], 3);
    }

    #[test]
    fn test_img_alt_no_images() {
        let page = PageContext::from_static_html("u", "<body><p>text only</p></body>");
        let result = run("a11y-img-alt", &page);
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_html_lang() {
        let good = PageContext::from_static_html("u", r#"<html lang="en"><body></body></html>"#);
        assert_eq!(run("a11y-html-lang", &good).status, Status::Pass);

        let bad = PageContext::from_static_html("u", "<html><body></body></html>");
        assert_eq!(run("a11y-html-lang", &bad).status, Status::Fail);
    }
}
