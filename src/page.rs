//! Page context consumed by every rule
//!
//! The crawler/fetcher and the real DOM engine are external collaborators.
//! `PageContext` is the read-only snapshot they hand to the audit engine,
//! and [`Dom`] is the seam through which rules query parsed markup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Query capability over parsed markup.
///
/// Implemented by the external DOM engine. The built-in [`StaticDom`] is a
/// deliberately naive regex-backed implementation used by the CLI snapshot
/// loader and the test suite.
pub trait Dom: Send + Sync {
    /// Text of the `<title>` element, if any
    fn title(&self) -> Option<String>;

    /// Visible body text with markup stripped
    fn body_text(&self) -> String;

    /// Number of elements matching a selector.
    ///
    /// Selector grammar is minimal: a tag name, optionally followed by a
    /// single attribute filter (`img[alt]`, `meta[name=description]`).
    fn count(&self, selector: &str) -> usize;

    /// Whether any element matches the selector
    fn exists(&self, selector: &str) -> bool {
        self.count(selector) > 0
    }

    /// Value of an attribute on the first matching element
    fn first_attr(&self, selector: &str, attr: &str) -> Option<String>;
}

/// Performance timing metrics reported by the fetcher (all optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerfTimings {
    /// Time to first byte, milliseconds
    #[serde(default)]
    pub ttfb_ms: Option<f64>,

    /// DOMContentLoaded, milliseconds
    #[serde(default)]
    pub dom_content_loaded_ms: Option<f64>,

    /// Full load event, milliseconds
    #[serde(default)]
    pub load_ms: Option<f64>,
}

/// Everything the audit engine knows about one fetched page.
///
/// Produced by the external crawler, treated as read-only by rules.
#[derive(Clone)]
pub struct PageContext {
    /// Final URL of the page (after redirects)
    pub url: String,

    /// Raw page markup as fetched
    pub html: String,

    /// Response headers, keys lowercased
    pub headers: HashMap<String, String>,

    /// HTTP status code
    pub status_code: u16,

    /// Total response time
    pub response_time: Duration,

    /// Optional performance timings
    pub timings: Option<PerfTimings>,

    dom: Arc<dyn Dom>,

    /// Optional post-script-execution snapshot, for rules that detect
    /// client-side-rendering discrepancies
    rendered: Option<Arc<dyn Dom>>,
}

impl PageContext {
    /// Create a page context with an externally supplied DOM
    pub fn new(url: &str, html: &str, dom: Arc<dyn Dom>) -> Self {
        Self {
            url: url.to_string(),
            html: html.to_string(),
            headers: HashMap::new(),
            status_code: 200,
            response_time: Duration::ZERO,
            timings: None,
            dom,
            rendered: None,
        }
    }

    /// Create a page context from raw HTML using the naive [`StaticDom`]
    pub fn from_static_html(url: &str, html: &str) -> Self {
        Self::new(url, html, Arc::new(StaticDom::new(html)))
    }

    /// Set response headers (keys are lowercased)
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self
    }

    /// Set the HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = status;
        self
    }

    /// Set the response time
    pub fn with_response_time(mut self, time: Duration) -> Self {
        self.response_time = time;
        self
    }

    /// Attach performance timings
    pub fn with_timings(mut self, timings: PerfTimings) -> Self {
        self.timings = Some(timings);
        self
    }

    /// Attach a post-script-execution DOM snapshot
    pub fn with_rendered(mut self, rendered: Arc<dyn Dom>) -> Self {
        self.rendered = Some(rendered);
        self
    }

    /// The parsed DOM
    pub fn dom(&self) -> &dyn Dom {
        self.dom.as_ref()
    }

    /// The rendered snapshot, if the crawler captured one
    pub fn rendered(&self) -> Option<&dyn Dom> {
        self.rendered.as_deref()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("url", &self.url)
            .field("status_code", &self.status_code)
            .field("html_len", &self.html.len())
            .field("rendered", &self.rendered.is_some())
            .finish()
    }
}

/// Naive regex-backed [`Dom`] implementation.
///
/// Good enough for auditing saved snapshots and for tests; a real crawl
/// should supply a proper DOM engine through [`PageContext::new`].
pub struct StaticDom {
    html: String,
}

impl StaticDom {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
        }
    }

    /// Split a selector into tag name and optional attribute filter
    fn parse_selector(selector: &str) -> (String, Option<(String, Option<String>)>) {
        match selector.split_once('[') {
            Some((tag, rest)) => {
                let inner = rest.trim_end_matches(']');
                let filter = match inner.split_once('=') {
                    Some((attr, value)) => (
                        attr.trim().to_lowercase(),
                        Some(value.trim_matches(['"', '\'']).to_lowercase()),
                    ),
                    None => (inner.trim().to_lowercase(), None),
                };
                (tag.trim().to_lowercase(), Some(filter))
            }
            None => (selector.trim().to_lowercase(), None),
        }
    }

    /// All opening tags for a tag name, as raw `<tag ...>` strings
    fn open_tags(&self, tag: &str) -> Vec<String> {
        let pattern = format!(r"(?is)<{}(\s[^>]*)?>", regex::escape(tag));
        let re = match regex::Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => return Vec::new(),
        };
        re.find_iter(&self.html)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn attr_value(tag_source: &str, attr: &str) -> Option<String> {
        let pattern = format!(
            r#"(?is)\s{}\s*=\s*("([^"]*)"|'([^']*)'|([^\s>]+))"#,
            regex::escape(attr)
        );
        let re = regex::Regex::new(&pattern).ok()?;
        let caps = re.captures(tag_source)?;
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().to_string())
    }

    fn has_attr(tag_source: &str, attr: &str) -> bool {
        let pattern = format!(r"(?is)\s{}(\s*=|\s|/?>|$)", regex::escape(attr));
        regex::Regex::new(&pattern)
            .map(|re| re.is_match(tag_source))
            .unwrap_or(false)
    }

    fn matching_tags(&self, selector: &str) -> Vec<String> {
        let (tag, filter) = Self::parse_selector(selector);
        self.open_tags(&tag)
            .into_iter()
            .filter(|src| match &filter {
                None => true,
                Some((attr, None)) => Self::has_attr(src, attr),
                Some((attr, Some(value))) => Self::attr_value(src, attr)
                    .map(|v| v.to_lowercase() == *value)
                    .unwrap_or(false),
            })
            .collect()
    }
}

impl Dom for StaticDom {
    fn title(&self) -> Option<String> {
        let re = regex::Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
        re.captures(&self.html)
            .map(|caps| decode_entities(caps[1].trim()))
    }

    fn body_text(&self) -> String {
        let mut text = self.html.clone();

        // Drop non-visible blocks before stripping tags
        for block in ["script", "style", "noscript", "head"] {
            let pattern = format!(r"(?is)<{0}[^>]*>.*?</{0}>", block);
            if let Ok(re) = regex::Regex::new(&pattern) {
                text = re.replace_all(&text, " ").to_string();
            }
        }

        if let Ok(re) = regex::Regex::new(r"(?is)<[^>]+>") {
            text = re.replace_all(&text, " ").to_string();
        }

        let decoded = decode_entities(&text);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn count(&self, selector: &str) -> usize {
        self.matching_tags(selector).len()
    }

    fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.matching_tags(selector)
            .first()
            .and_then(|src| Self::attr_value(src, attr))
    }
}

/// Decode the handful of entities that matter for text comparison
fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
