use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the manual indexer
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// configuration that targets a local Elasticsearch node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub selectors: SelectorsConfig,
}

/// Search engine connection and index naming
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the Elasticsearch node
    pub endpoint: String,

    /// Name of the index every manual section is written to
    pub index: String,

    /// Mapping type of the written documents
    #[serde(rename = "document-type")]
    pub document_type: String,

    /// Address documents as `/{index}/{type}/{id}` instead of `/{index}/_doc/{id}`
    #[serde(rename = "typed-endpoints")]
    pub typed_endpoints: bool,

    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9200".to_string(),
            index: crate::search::DEFAULT_INDEX.to_string(),
            document_type: crate::search::DEFAULT_DOCUMENT_TYPE.to_string(),
            typed_endpoints: false,
            username: None,
            password: None,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout")]
    pub fetch_timeout: u64,

    /// Deadline for fetching, extracting and writing every section of one manual (seconds)
    #[serde(rename = "run-deadline")]
    pub run_deadline: u64,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            fetch_timeout: 30,
            run_deadline: 1800,
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

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn user_agent_string(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "manual-indexer".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://docs.typo3.org/".to_string(),
            contact_email: "documentation@typo3.org".to_string(),
        }
    }
}

/// CSS selectors describing the rendered manual layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorsConfig {
    /// Container on the sitemap page holding the links to index
    #[serde(rename = "sitemap-container")]
    pub sitemap_container: String,

    /// Page chrome element rendering "<manual name> (<version>)"
    #[serde(rename = "project-title")]
    pub project_title: String,

    /// File names of generated pages that never get indexed
    #[serde(rename = "excluded-pages")]
    pub excluded_pages: Vec<String>,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            sitemap_container: ".sitemap".to_string(),
            project_title: ".sidebartop .project".to_string(),
            excluded_pages: vec!["Targets.html".to_string()],
        }
    }
}
