use crate::{UrlError, UrlResult};
use url::Url;

/// Path appended to a manual's base URL to reach its sitemap page
pub const SITEMAP_SUFFIX: &str = "/Sitemap/Index.html";

/// Derives the sitemap page URL of a manual from its base URL
///
/// Exactly one trailing slash is stripped from the path before the suffix is
/// appended. Scheme, host, port and query are kept; the fragment is dropped.
///
/// # Examples
///
/// ```
/// use manual_indexer::url::resolve_sitemap_url;
///
/// let a = resolve_sitemap_url("https://docs.example.org/m/core/10.4/en-us/").unwrap();
/// let b = resolve_sitemap_url("https://docs.example.org/m/core/10.4/en-us").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "https://docs.example.org/m/core/10.4/en-us/Sitemap/Index.html");
/// ```
pub fn resolve_sitemap_url(base_url: &str) -> UrlResult<Url> {
    let mut url = Url::parse(base_url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let path = url.path();
    let path = path.strip_suffix('/').unwrap_or(path);
    let sitemap_path = format!("{}{}", path, SITEMAP_SUFFIX);

    url.set_path(&sitemap_path);
    url.set_fragment(None);

    Ok(url)
}

/// Returns the manual root (directory above `Sitemap/`) for a sitemap URL
pub fn manual_root(sitemap_url: &Url) -> UrlResult<Url> {
    sitemap_url
        .join("../")
        .map_err(|e| UrlError::Malformed(format!("{}: {}", sitemap_url, e)))
}
