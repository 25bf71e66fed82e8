//! Crawler module for manual pages
//!
//! This module contains the indexing pipeline, including:
//! - HTTP fetching of sitemap and content pages
//! - Sitemap link discovery
//! - Section extraction and manual title parsing
//! - Overall run coordination

mod coordinator;
mod discovery;
mod extractor;
mod fetcher;
mod title;

pub use coordinator::{IndexRunResult, LinkFailure, ManualIndexer, RunLimits};
pub use discovery::{DiscoveredLink, LinkDiscoverer, SitemapDiscoverer};
pub use extractor::{SectionContent, SectionExtractor, PERMALINK_GLYPH};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use title::{normalize_whitespace, parse_project_title, ProjectTitle};
