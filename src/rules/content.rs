//! Content quality rules

use crate::analyzers::content::ContentOutcome;
use crate::result::RuleResult;
use crate::rule::RuleDef;
use serde_json::json;

/// Pages with fewer words than this are flagged as thin
const THIN_CONTENT_WORDS: usize = 150;

pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new("content-near-duplicate", "content")
            .with_name("Near-duplicate content")
            .with_description(
                "Pages whose body text closely matches an earlier page dilute ranking signals",
            )
            .with_weight(9.0)
            .stateful(|page, session| {
                let body = page.dom().body_text();
                match session.content().record(&page.url, &body) {
                    ContentOutcome::InsufficientContent => RuleResult::pass(
                        "content-near-duplicate",
                        "insufficient content to compare",
                    ),
                    ContentOutcome::FewTrigrams => RuleResult::pass(
                        "content-near-duplicate",
                        "too few trigrams for reliable comparison",
                    ),
                    ContentOutcome::NearDuplicate { url, similarity } => RuleResult::fail(
                        "content-near-duplicate",
                        &format!("near-duplicate of {} (similarity {:.2})", url, similarity),
                    )
                    .with_details(json!({ "url": url, "similarity": similarity })),
                    ContentOutcome::Similar { url, similarity } => RuleResult::warn(
                        "content-near-duplicate",
                        &format!("similar content to {} (similarity {:.2})", url, similarity),
                    )
                    .with_details(json!({ "url": url, "similarity": similarity })),
                    ContentOutcome::Distinct { best } => {
                        let mut result =
                            RuleResult::pass("content-near-duplicate", "content is distinct");
                        if let Some((url, similarity)) = best {
                            result = result
                                .with_details(json!({ "url": url, "similarity": similarity }));
                        }
                        result
                    }
                }
            }),
        RuleDef::new("content-word-count", "content")
            .with_name("Sufficient word count")
            .with_description("Very short pages rarely satisfy a search intent")
            .with_weight(5.0)
            .stateless(|page| {
                let words = page.dom().body_text().split_whitespace().count();
                if words >= THIN_CONTENT_WORDS {
                    RuleResult::pass(
                        "content-word-count",
                        &format!("page has {} words", words),
                    )
                } else {
                    RuleResult::warn(
                        "content-word-count",
                        &format!("thin content: {} words", words),
                    )
                    .with_details(json!({ "words": words }))
                }
            }),
        RuleDef::new("content-render-parity", "content")
            .with_name("Rendered content parity")
            .with_description(
                "Pages that only gain their text after script execution are invisible to \
                 crawlers that do not render",
            )
            .with_weight(3.0)
            .stateless(|page| {
                let Some(rendered) = page.rendered() else {
                    return RuleResult::pass(
                        "content-render-parity",
                        "no rendered snapshot to compare",
                    );
                };
                let static_words = page.dom().body_text().split_whitespace().count();
                let rendered_words = rendered.body_text().split_whitespace().count();
                // Rendering adding more than half the words again means
                // the static markup is missing substantial content.
                if rendered_words > static_words + static_words / 2 {
                    RuleResult::warn(
                        "content-render-parity",
                        &format!(
                            "rendered page has {} words, static markup only {}",
                            rendered_words, static_words
                        ),
                    )
                    .with_details(json!({
                        "static_words": static_words,
                        "rendered_words": rendered_words,
                    }))
                } else {
                    RuleResult::pass("content-render-parity", "static and rendered content agree")
                }
            }),
    ]
}
