//! Title extraction and cleanup

use crate::article::{Exclusion, Screened};
use crate::config::FilterConfig;
use scraper::{Html, Selector};

/// Title reported for articles dropped by category
pub const IGNORED_TITLE: &str = "ignore";

/// Characters that cannot appear in a stored title, with their replacements
const ILLEGAL_CHARS: &[(char, char)] = &[
    ('/', '／'),
    ('\\', '＼'),
    (':', '：'),
    ('*', '＊'),
    ('?', '？'),
    ('"', '＂'),
    ('<', '＜'),
    ('>', '＞'),
    ('|', '｜'),
];

/// Reads and cleans the document `<title>`
///
/// Returns `None` if the document has no `<title>` element. A title naming
/// an ignored category is returned as [`IGNORED_TITLE`] with
/// [`Exclusion::IgnoreCate`] and is not cleaned further.
pub fn fetch_title(document: &Html, filters: &FilterConfig) -> Option<Screened<String>> {
    let selector = Selector::parse("title").ok()?;
    let raw = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())?;

    if filters
        .ignore_categories
        .iter()
        .any(|category| raw.contains(category.as_str()))
    {
        return Some(Screened::Excluded(
            IGNORED_TITLE.to_string(),
            Exclusion::IgnoreCate,
        ));
    }

    let stripped = filters
        .title_suffixes
        .iter()
        .fold(raw, |title, suffix| title.replace(suffix.as_str(), ""));

    Some(Screened::Kept(sanitize_title(stripped.trim())))
}

/// Replaces characters that are illegal in storage keys and file names
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            ILLEGAL_CHARS
                .iter()
                .find(|(illegal, _)| *illegal == c)
                .map(|(_, replacement)| *replacement)
                .unwrap_or(c)
        })
        .collect()
}
