use serde::Deserialize;

/// Default listing page and base for site-relative references
pub const DEFAULT_ROOT_URL: &str = "https://news.ycombinator.com/";

/// Main configuration structure for Story-Archiver
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Site root: fetched as the listing page and used to resolve relative links
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Maximum number of entries archived at the same time
    #[serde(rename = "max-concurrent-entries")]
    pub max_concurrent_entries: usize,

    /// Maximum number of comment links downloaded at the same time per entry
    #[serde(rename = "max-concurrent-downloads")]
    pub max_concurrent_downloads: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Whether a `readme` manifest is written into each archive
    #[serde(rename = "write-manifest")]
    pub write_manifest: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            max_concurrent_entries: 16,
            max_concurrent_downloads: 8,
            request_timeout_secs: 30,
            write_manifest: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
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
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/story-archiver/story-archiver".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory that receives one sub-directory per story
    pub directory: String,

    /// Listing period label; recorded but does not alter the crawl
    pub period: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./archive".to_string(),
            period: "day".to_string(),
        }
    }
}
