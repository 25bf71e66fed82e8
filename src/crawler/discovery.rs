//! Sitemap link discovery
//!
//! The sitemap page of a rendered manual lists every page and section in a
//! dedicated container. Only anchors inside that container are followed.

use crate::config::SelectorsConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::url::{is_within_manual, manual_root};
use crate::IndexerError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

const LINK_SELECTOR: &str = "a[href]";

/// A URL pointing into the manual
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredLink {
    /// Absolute URL, including the fragment when present
    pub url: Url,
}

impl DiscoveredLink {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// The section anchor, if the link targets one
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment().filter(|f| !f.is_empty())
    }

    /// The page URL without fragment
    pub fn page_url(&self) -> Url {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url
    }
}

/// Capability to list the pages of a manual from its sitemap
#[async_trait]
pub trait LinkDiscoverer: Send + Sync {
    /// Returns the links listed on the sitemap page, in document order
    async fn discover_links(&self, sitemap_url: &Url) -> Result<Vec<DiscoveredLink>, IndexerError>;
}

/// [`LinkDiscoverer`] that reads the sitemap container of a rendered manual
pub struct SitemapDiscoverer {
    fetcher: Arc<dyn PageFetcher>,
    container: Selector,
    links: Selector,
    excluded_pages: Vec<String>,
}

impl SitemapDiscoverer {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        selectors: &SelectorsConfig,
    ) -> Result<Self, IndexerError> {
        let container = Selector::parse(&selectors.sitemap_container)
            .map_err(|e| IndexerError::selector(&selectors.sitemap_container, e))?;
        let links =
            Selector::parse(LINK_SELECTOR).map_err(|e| IndexerError::selector(LINK_SELECTOR, e))?;

        Ok(Self {
            fetcher,
            container,
            links,
            excluded_pages: selectors.excluded_pages.clone(),
        })
    }

    /// Extracts the manual links of an already fetched sitemap page
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href>` inside the sitemap container, resolved against the sitemap URL
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - Fragment-only links (anchors on the sitemap itself)
    /// - URLs outside the manual root (other hosts, sibling manuals)
    /// - Excluded generated pages such as `Targets.html`
    /// - Repeats of an already listed URL
    ///
    /// # Errors
    ///
    /// `IndexerError::Discovery` if the page has no sitemap container.
    pub fn parse_sitemap(
        &self,
        html: &str,
        sitemap_url: &Url,
    ) -> Result<Vec<DiscoveredLink>, IndexerError> {
        let document = Html::parse_document(html);
        let root = manual_root(sitemap_url)?;

        let mut containers = document.select(&self.container).peekable();
        if containers.peek().is_none() {
            return Err(IndexerError::discovery(
                sitemap_url.as_str(),
                "sitemap container not found",
            ));
        }

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for container in containers {
            for element in container.select(&self.links) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                let Some(url) = resolve_link(href, sitemap_url) else {
                    continue;
                };

                if !is_within_manual(&url, &root) {
                    tracing::debug!("Skipping link outside the manual: {}", url);
                    continue;
                }

                if self.is_excluded(&url) {
                    tracing::debug!("Skipping excluded page: {}", url);
                    continue;
                }

                if seen.insert(url.to_string()) {
                    links.push(DiscoveredLink::new(url));
                }
            }
        }

        Ok(links)
    }

    fn is_excluded(&self, url: &Url) -> bool {
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("");
        self.excluded_pages.iter().any(|page| page == file_name)
    }
}

#[async_trait]
impl LinkDiscoverer for SitemapDiscoverer {
    async fn discover_links(&self, sitemap_url: &Url) -> Result<Vec<DiscoveredLink>, IndexerError> {
        let page = self.fetcher.fetch_page(sitemap_url).await?;
        let links = self.parse_sitemap(&page.body, &page.final_url)?;

        tracing::info!("Discovered {} links on {}", links.len(), sitemap_url);
        Ok(links)
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}
