use crate::article::time::shanghai;
use crate::config::SiteConfig;
use chrono::{DateTime, SecondsFormat, Utc};

/// Query parameter that only selects a page template
const TEMPLATE_PARAM: &str = "?tmpl=";

/// Renders the stored markdown for an article
///
/// The output is a pure function of its inputs.
pub fn format_content(
    title: &str,
    update_time: DateTime<Utc>,
    site: &SiteConfig,
    source_url: &str,
    body: &str,
) -> String {
    let last_update = update_time
        .with_timezone(&shanghai())
        .to_rfc3339_opts(SecondsFormat::Secs, false);
    let source = display_url(source_url);

    format!(
        "# {title}\n\nLastUpdate: {last_update} @ [{site_title}](/list/?v={site_title}): [{domain}](http://{domain})\n\n---\n{body}\n\n原地址：[{source}]({source})",
        title = title,
        last_update = last_update,
        site_title = site.title,
        domain = site.domain,
        body = body,
        source = source,
    )
}

/// Percent-decodes the URL and drops the template selector
///
/// A decode failure is reported inline instead of aborting the article.
fn display_url(source_url: &str) -> String {
    match urlencoding::decode(source_url) {
        Ok(decoded) => decoded
            .split(TEMPLATE_PARAM)
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(e) => format!("{}\n\nunescape url error:\n{}", source_url, e),
    }
}
