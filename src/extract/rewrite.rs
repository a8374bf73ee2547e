//! Ordered markup-to-markdown rewrite rules
//!
//! Rules run in declaration order over each rendered fragment; later rules
//! see the output of earlier ones.

use once_cell::sync::Lazy;
use regex::Regex;

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("rewrite patterns are valid")
}

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| pattern(r"</?p(?:\s[^>]*)?>"));
static OPEN_QUOTE: Lazy<Regex> = Lazy::new(|| pattern("「"));
static CLOSE_QUOTE: Lazy<Regex> = Lazy::new(|| pattern("」"));
static BOLD: Lazy<Regex> = Lazy::new(|| pattern(r"(?s)<b(?:\s[^>]*)?>(.*?)</b>"));
static STRONG: Lazy<Regex> = Lazy::new(|| pattern(r"(?s)<strong(?:\s[^>]*)?>(.*?)</strong>"));
static ABSOLUTE_LINK: Lazy<Regex> = Lazy::new(|| {
    pattern(r#"(?s)<a\s[^>]*?href="((?:https?:)?//[^"]*|mailto:[^"]*)"[^>]*>(.*?)</a>"#)
});
// In-page anchors and script links have nowhere to point once rendered
static INERT_LINK: Lazy<Regex> = Lazy::new(|| {
    pattern(r##"(?si)<a\s[^>]*?href="(?:#|javascript:)[^"]*"[^>]*>(.*?)</a>"##)
});
// Root-relative paths, or path-relative ones whose first segment has no scheme
static RELATIVE_LINK: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r##"(?s)<a\s[^>]*?href="(?:/([^"]*)|([^"/#:?][^"/?#:]*(?:[/?#][^"]*)?))"[^>]*>(.*?)</a>"##,
    )
});

/// A single regex substitution
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(name: &'static str, pattern: &Regex, replacement: impl Into<String>) -> Self {
        Self {
            name,
            pattern: pattern.clone(),
            replacement: replacement.into(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct RewriteRules {
    rules: Vec<RewriteRule>,
}

impl RewriteRules {
    /// The standard rule list, resolving relative links against `origin`
    ///
    /// `origin` is a scheme-and-host string without a trailing slash, e.g.
    /// `https://udn.com`.
    pub fn for_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/').replace('$', "$$");

        Self {
            rules: vec![
                RewriteRule::new("paragraph", &PARAGRAPH, ""),
                RewriteRule::new("open-quote", &OPEN_QUOTE, "“"),
                RewriteRule::new("close-quote", &CLOSE_QUOTE, "”"),
                RewriteRule::new("bold", &BOLD, "**${1}**"),
                RewriteRule::new("strong", &STRONG, "**${1}**"),
                RewriteRule::new("absolute-link", &ABSOLUTE_LINK, "[${2}](${1})"),
                RewriteRule::new("inert-link", &INERT_LINK, "${1}"),
                RewriteRule::new(
                    "relative-link",
                    &RELATIVE_LINK,
                    format!("[${{3}}]({}/${{1}}${{2}})", origin),
                ),
            ],
        }
    }

    pub fn apply(&self, fragment: &str) -> String {
        self.rules
            .iter()
            .fold(fragment.to_string(), |text, rule| rule.apply(&text))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}
