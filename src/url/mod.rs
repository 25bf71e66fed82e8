//! URL handling module
//!
//! This module provides sitemap URL resolution, the scope check that keeps
//! discovery inside one manual, and the section URL normalization that
//! document ids are derived from.

mod normalize;
mod sitemap;

pub use normalize::normalize_section_url;
pub use sitemap::{manual_root, resolve_sitemap_url, SITEMAP_SUFFIX};

use url::Url;

/// Returns true if `url` lives below the manual rooted at `root`
///
/// Scheme, host and port must match, and the path must start with the root's
/// path. The fragment and query of `url` are ignored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use manual_indexer::url::is_within_manual;
///
/// let root = Url::parse("https://docs.example.org/m/core/10.4/en-us/").unwrap();
/// let page = Url::parse("https://docs.example.org/m/core/10.4/en-us/Intro/Index.html#setup").unwrap();
/// let other = Url::parse("https://docs.example.org/m/other/main/en-us/Index.html").unwrap();
///
/// assert!(is_within_manual(&page, &root));
/// assert!(!is_within_manual(&other, &root));
/// ```
pub fn is_within_manual(url: &Url, root: &Url) -> bool {
    url.scheme() == root.scheme()
        && url.host_str().map(str::to_lowercase) == root.host_str().map(str::to_lowercase)
        && url.port_or_known_default() == root.port_or_known_default()
        && url.path().starts_with(root.path())
}
