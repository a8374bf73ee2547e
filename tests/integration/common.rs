//! Shared fixtures for the integration tests

use chrono::{Duration, Utc};
use udn_harvest::config::{
    Config, CrawlerConfig, DiscoveryConfig, FilterConfig, OutputConfig, SiteConfig,
    TranslateConfig, UserAgentConfig,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Matches article links served by the local mock server
pub const MOCK_ARTICLE_PATTERN: &str = r"^http://127\.0\.0\.1:\d+/news/story/\d+/\d+$";

pub const INDEX_PATH: &str = "/news/breaknews/1/99";

/// Creates a test configuration pointing at a mock server
pub fn create_test_config(base_url: &str, db_path: &str) -> Config {
    Config {
        site: SiteConfig {
            title: "聯合新聞網".to_string(),
            domain: "udn.com".to_string(),
            timeout: "5s".to_string(),
        },
        crawler: CrawlerConfig {
            workers: 2,
            max_index_pages: 5,
            freshness_days: 3,
            interval: "30m".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        discovery: DiscoveryConfig {
            index_urls: vec![format!("{}{}", base_url, INDEX_PATH)],
            article_pattern: MOCK_ARTICLE_PATTERN.to_string(),
        },
        filters: FilterConfig::default(),
        translate: TranslateConfig {
            target: "none".to_string(),
        },
    }
}

/// A publish time comfortably inside the freshness window
pub fn fresh_date() -> String {
    (Utc::now() - Duration::hours(1)).to_rfc3339()
}

/// A publish time well outside the freshness window
pub fn stale_date() -> String {
    (Utc::now() - Duration::days(10)).to_rfc3339()
}

/// A main-site article page
pub fn article_page(title: &str, published: &str, paragraphs: &str) -> String {
    format!(
        r#"<html><head><title>{}</title>
<script type="application/ld+json">{{"@type":"NewsArticle","datePublished": "{}","author":"udn"}}</script>
</head><body>
<section class="article-content__editor ">{}</section>
</body></html>"#,
        title, published, paragraphs
    )
}

/// An article page that redirects through inline script
pub fn redirect_page(title: &str, published: &str, target: &str, extra: &str) -> String {
    format!(
        r#"<html><head><title>{}</title>
<script language=javascript>window.location.href="{}";</script>
<script type="application/ld+json">{{"datePublished": "{}"}}</script>
</head><body>{}</body></html>"#,
        title, target, published, extra
    )
}

/// Serves `body` as HTML at `route`
pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Answers `route` with a bare status code
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
