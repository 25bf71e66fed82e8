//! Manual indexing coordinator
//!
//! Composes the pipeline for one manual:
//! - Provisioning the index before any write
//! - Resolving the sitemap and discovering links
//! - Fetching, extracting and writing every fragment link, with bounded fan-out
//! - Retracting documents a re-crawl no longer produces

use crate::config::Config;
use crate::crawler::discovery::{DiscoveredLink, LinkDiscoverer, SitemapDiscoverer};
use crate::crawler::extractor::SectionExtractor;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::search::{document_id, ensure_index, write_document, IndexDocument, IndexSchema, SearchClient};
use crate::url::{manual_root, resolve_sitemap_url};
use crate::IndexerError;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A link whose processing failed without aborting the run
#[derive(Debug)]
pub struct LinkFailure {
    pub url: String,
    pub error: IndexerError,
}

/// Outcome of indexing one manual
#[derive(Debug)]
pub struct IndexRunResult {
    pub manual_url: String,
    pub sitemap_url: String,

    /// Documents written
    pub indexed: usize,

    /// Links without a fragment
    pub skipped: usize,

    /// Per-link failures in discovery order
    pub errors: Vec<LinkFailure>,

    /// Stale documents deleted after a reindex
    pub retracted: u64,

    /// Ids of the written documents in discovery order
    pub document_ids: Vec<String>,

    /// Distinct (manual, version) pairs seen in the written documents
    pub editions: BTreeSet<(String, String)>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IndexRunResult {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Per-link result, before it is folded into the run result
enum LinkOutcome {
    Indexed(IndexDocument),
    Skipped,
    Failed(IndexerError),
}

/// One finished crawl, before any retraction
struct Crawl {
    result: IndexRunResult,

    /// Ids of every discovered fragment link, failed ones included
    keep_ids: Vec<String>,

    /// URL every document of this manual lives below
    root: Url,
}

/// Limits applied to one indexing run
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    /// Page fetches in flight at once
    pub max_concurrent_fetches: usize,

    /// Deadline for the per-link phase of a run
    pub run_deadline: Duration,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            run_deadline: Duration::from_secs(1800),
        }
    }
}

/// Indexes manuals into a search engine
///
/// Every collaborator is injected, so discovery, fetching and the search
/// backend can each be replaced independently.
pub struct ManualIndexer {
    search: Arc<dyn SearchClient>,
    discoverer: Arc<dyn LinkDiscoverer>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: SectionExtractor,
    schema: IndexSchema,
    limits: RunLimits,
}

impl ManualIndexer {
    pub fn new(
        search: Arc<dyn SearchClient>,
        discoverer: Arc<dyn LinkDiscoverer>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: SectionExtractor,
        schema: IndexSchema,
        limits: RunLimits,
    ) -> Self {
        Self {
            search,
            discoverer,
            fetcher,
            extractor,
            schema,
            limits,
        }
    }

    /// Wires the HTTP fetcher and sitemap discoverer described by `config`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use manual_indexer::{Config, ElasticsearchClient, ManualIndexer};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default();
    /// let search = Arc::new(ElasticsearchClient::from_config(&config.search)?);
    /// let indexer = ManualIndexer::from_config(&config, search)?;
    /// let result = indexer.reindex_manual("https://docs.example.org/m/core/main/en-us").await?;
    /// println!("{} sections indexed", result.indexed);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &Config, search: Arc<dyn SearchClient>) -> Result<Self, IndexerError> {
        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(HttpFetcher::from_config(&config.user_agent, &config.crawler)?);
        let discoverer = Arc::new(SitemapDiscoverer::new(fetcher.clone(), &config.selectors)?);
        let extractor = SectionExtractor::new(&config.selectors)?;

        Ok(Self::new(
            search,
            discoverer,
            fetcher,
            extractor,
            IndexSchema::new(&config.search.index, &config.search.document_type),
            RunLimits {
                max_concurrent_fetches: config.crawler.max_concurrent_fetches.max(1) as usize,
                run_deadline: config.crawler.run_deadline(),
            },
        ))
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Ensures the target index exists; see [`crate::search::ensure_index`]
    pub async fn ensure_index(&self) -> Result<bool, IndexerError> {
        ensure_index(self.search.as_ref(), &self.schema).await
    }

    /// Indexes every section of a manual
    ///
    /// # Steps
    ///
    /// 1. Ensure the index exists (fatal on failure)
    /// 2. Resolve the sitemap URL (fatal on malformed input)
    /// 3. Discover links (fatal on fetch or structure failure)
    /// 4. For each link in discovery order: skip it without a fragment,
    ///    otherwise fetch, extract and write; failures are recorded and the
    ///    run continues
    ///
    /// # Errors
    ///
    /// Only run-fatal errors are returned; per-link errors are in
    /// [`IndexRunResult::errors`].
    pub async fn index_manual(&self, manual_url: &str) -> Result<IndexRunResult, IndexerError> {
        self.crawl(manual_url).await.map(|crawl| crawl.result)
    }

    /// Indexes a manual and retracts its documents the crawl no longer produced
    ///
    /// After the crawl, every document sharing a written (manual, version)
    /// pair and living below this manual's root URL is deleted unless its id
    /// belongs to a fragment link discovered in this run. Links that failed
    /// still count as discovered, so a transient outage never erases content.
    /// Editions without a manual name and version are never swept.
    pub async fn reindex_manual(&self, manual_url: &str) -> Result<IndexRunResult, IndexerError> {
        let crawl = self.crawl(manual_url).await?;
        let mut result = crawl.result;

        let mut retracted = 0;
        for (manual, version) in &result.editions {
            if manual.is_empty() && version.is_empty() {
                tracing::warn!(
                    "Not retracting documents of {}: sections carry no manual name or version",
                    manual_url
                );
                continue;
            }

            let deleted = self
                .search
                .delete_stale(
                    &self.schema.index,
                    manual,
                    version,
                    crawl.root.as_str(),
                    &crawl.keep_ids,
                )
                .await
                .map_err(|source| IndexerError::Retraction {
                    manual: manual.clone(),
                    version: version.clone(),
                    source,
                })?;

            if deleted > 0 {
                tracing::info!("Retracted {} stale documents of {} ({})", deleted, manual, version);
            }
            retracted += deleted;
        }

        result.retracted = retracted;
        result.finished_at = Utc::now();
        Ok(result)
    }

    async fn crawl(&self, manual_url: &str) -> Result<Crawl, IndexerError> {
        let started_at = Utc::now();
        tracing::info!("Indexing manual {}", manual_url);

        self.ensure_index().await?;

        let sitemap_url = resolve_sitemap_url(manual_url)?;
        let root = manual_root(&sitemap_url)?;
        let links = self.discoverer.discover_links(&sitemap_url).await?;

        let keep_ids: Vec<String> = links
            .iter()
            .filter(|link| link.fragment().is_some())
            .filter_map(|link| document_id(link.url.as_str()).ok())
            .collect();

        let outcomes = tokio::time::timeout(self.limits.run_deadline, self.process_links(&links))
            .await
            .map_err(|_| IndexerError::Timeout(self.limits.run_deadline))?;

        let mut result = IndexRunResult {
            manual_url: manual_url.to_string(),
            sitemap_url: sitemap_url.to_string(),
            indexed: 0,
            skipped: 0,
            errors: Vec::new(),
            retracted: 0,
            document_ids: Vec::new(),
            editions: BTreeSet::new(),
            started_at,
            finished_at: started_at,
        };

        for (link, outcome) in links.iter().zip(outcomes) {
            match outcome {
                LinkOutcome::Indexed(document) => {
                    result.indexed += 1;
                    result
                        .editions
                        .insert((document.body.manual, document.body.version));
                    result.document_ids.push(document.id);
                }
                LinkOutcome::Skipped => result.skipped += 1,
                LinkOutcome::Failed(error) => {
                    tracing::warn!("Failed to index {}: {}", link.url, error);
                    result.errors.push(LinkFailure {
                        url: link.url.to_string(),
                        error,
                    });
                }
            }
        }

        result.finished_at = Utc::now();
        tracing::info!(
            "Indexed {} sections of {} ({} skipped, {} failed)",
            result.indexed,
            manual_url,
            result.skipped,
            result.failed()
        );

        Ok(Crawl {
            result,
            keep_ids,
            root,
        })
    }

    /// Processes links with bounded concurrency, returning outcomes in link order
    async fn process_links(&self, links: &[DiscoveredLink]) -> Vec<LinkOutcome> {
        stream::iter(links)
            .map(|link| self.process_link(link))
            .buffered(self.limits.max_concurrent_fetches)
            .collect()
            .await
    }

    async fn process_link(&self, link: &DiscoveredLink) -> LinkOutcome {
        let Some(fragment) = link.fragment() else {
            tracing::debug!("Skipping {} (no fragment)", link.url);
            return LinkOutcome::Skipped;
        };

        match self.index_fragment(link, fragment).await {
            Ok(document) => LinkOutcome::Indexed(document),
            Err(error) => LinkOutcome::Failed(error),
        }
    }

    async fn index_fragment(
        &self,
        link: &DiscoveredLink,
        fragment: &str,
    ) -> Result<IndexDocument, IndexerError> {
        let page = self.fetcher.fetch_page(&link.page_url()).await?;
        let section = self.extractor.extract_section(&page, fragment)?;
        let document = IndexDocument::from_section(&self.schema, section)?;

        write_document(self.search.as_ref(), &document).await?;
        tracing::debug!("Indexed {} as {}", document.body.uri, document.id);

        Ok(document)
    }
}
