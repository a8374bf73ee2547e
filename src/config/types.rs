use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Fetch timeout used when the configured one cannot be parsed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Main configuration structure for udn-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

/// Static metadata about the harvested site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Display title of the site, e.g. "聯合新聞網"
    pub title: String,

    /// Bare domain, e.g. "udn.com"
    pub domain: String,

    /// Per-request timeout as a humantime string ("30s", "1m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl SiteConfig {
    /// Parses the configured timeout, falling back to one minute
    pub fn timeout(&self) -> Duration {
        match humantime::parse_duration(&self.timeout) {
            Ok(timeout) => timeout,
            Err(e) => {
                tracing::warn!(
                    "[{}] timeout '{}' is invalid ({}), using {:?}",
                    self.title,
                    self.timeout,
                    e,
                    DEFAULT_TIMEOUT
                );
                DEFAULT_TIMEOUT
            }
        }
    }

    /// Content-addressed identifier of the site, derived from its domain
    pub fn website_id(&self) -> String {
        hex::encode(Sha256::digest(self.domain.as_bytes()))
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of articles assembled concurrently
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Maximum number of listing pages followed per index URL
    #[serde(rename = "max-index-pages", default = "default_max_index_pages")]
    pub max_index_pages: u32,

    /// Articles published longer ago than this are skipped
    #[serde(rename = "freshness-days", default = "default_freshness_days")]
    pub freshness_days: u32,

    /// Pause between crawl cycles as a humantime string
    #[serde(default = "default_interval")]
    pub interval: String,
}

impl CrawlerConfig {
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.freshness_days))
    }

    /// Parses the cycle interval; validation guarantees it is well-formed
    pub fn interval(&self) -> Duration {
        humantime::parse_duration(&self.interval).unwrap_or(Duration::from_secs(30 * 60))
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Where discovery starts and what an article link looks like
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Listing pages that seed link discovery
    #[serde(rename = "index-urls")]
    pub index_urls: Vec<String>,

    /// Regex an absolute link must match to count as an article
    #[serde(rename = "article-pattern", default = "default_article_pattern")]
    pub article_pattern: String,
}

/// Substring lists that decide what is kept
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// A title containing any of these is off-topic
    #[serde(rename = "ignore-categories", default = "default_ignore_categories")]
    pub ignore_categories: Vec<String>,

    /// Category decorations removed from titles
    #[serde(rename = "title-suffixes", default = "default_title_suffixes")]
    pub title_suffixes: Vec<String>,

    /// Redirect targets containing any of these are paywalled
    #[serde(rename = "ignore-domains", default = "default_ignore_domains")]
    pub ignore_domains: Vec<String>,

    /// Phrases that mark a subscription wall in the page source
    #[serde(rename = "paywall-markers", default = "default_paywall_markers")]
    pub paywall_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_categories: default_ignore_categories(),
            title_suffixes: default_title_suffixes(),
            ignore_domains: default_ignore_domains(),
            paywall_markers: default_paywall_markers(),
        }
    }
}

/// Script conversion applied to the formatted content
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateConfig {
    /// Target variant ("zh-Hans", "zh-CN", ...) or "none"
    #[serde(default = "default_translate_target")]
    pub target: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            target: default_translate_target(),
        }
    }
}

fn default_timeout() -> String {
    "1m".to_string()
}

fn default_workers() -> u32 {
    4
}

fn default_max_index_pages() -> u32 {
    5
}

fn default_freshness_days() -> u32 {
    3
}

fn default_interval() -> String {
    "30m".to_string()
}

fn default_article_pattern() -> String {
    r"^https?://(?:[a-z0-9-]+\.)*udn\.com/news/story/\d+/\d+$".to_string()
}

fn default_translate_target() -> String {
    "zh-Hans".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_ignore_categories() -> Vec<String> {
    strings(&[
        "| 法律前線",
        "| 職場觀測",
        "| 流行消費",
        "股市",
        "娛樂",
        "旅遊",
        "運動",
        "文教",
        "數位",
        " | 聯合晚點評 | 聯合報",
        "| 情慾犯罪",
        "| 動物星球",
        "| 星座運勢",
        "| 紓困振興五倍券",
        "| 稅務法務",
        "| 地方",
    ])
}

fn default_title_suffixes() -> Vec<String> {
    strings(&[
        " | 全球",
        " | 世界萬象",
        " | 產經",
        " | 雜誌",
        " | 生活",
        " | 大台北",
        " | 地方",
        " | 社會",
        " | 運動",
        " | 娛樂",
        " | 健康",
        " | 股市",
        " | 要聞",
        " | 文教",
        " | 社論",
        " | 評論",
        " | 兩岸",
        " | 數位",
        " | Oops",
        " | 網搜追夯事",
        " | 奇聞不要看",
        " | 旅遊",
        " | 聯合新聞網",
    ])
}

fn default_ignore_domains() -> Vec<String> {
    strings(&["vip.udn.com"])
}

fn default_paywall_markers() -> Vec<String> {
    strings(&["選擇下列方案繼續閱讀：", "訂閱看完整精彩內容"])
}
