//! Section extraction
//!
//! Isolates the subtree a fragment identifies and pulls out everything a
//! search document needs: heading title, flattened body text, and the manual
//! name and version rendered in the page chrome.

use crate::config::SelectorsConfig;
use crate::crawler::fetcher::FetchedPage;
use crate::crawler::title::{parse_project_title, ProjectTitle};
use crate::IndexerError;
use scraper::{ElementRef, Html, Selector};

/// Glyph the documentation renderer appends to headings as permalink anchor
pub const PERMALINK_GLYPH: char = '¶';

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Content of one heading-level section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionContent {
    pub title: String,
    pub body_text: String,
    pub manual: String,
    pub version: String,
    /// Absolute page URL including the section fragment
    pub source_uri: String,
}

impl SectionContent {
    /// Trims every field independently
    fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            body_text: self.body_text.trim().to_string(),
            manual: self.manual.trim().to_string(),
            version: self.version.trim().to_string(),
            source_uri: self.source_uri.trim().to_string(),
        }
    }
}

/// Extracts sections from fetched manual pages
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    headings: Selector,
    project_title: Selector,
}

impl SectionExtractor {
    /// Compiles the layout selectors
    pub fn new(selectors: &SelectorsConfig) -> Result<Self, IndexerError> {
        let headings = Selector::parse(HEADING_SELECTOR)
            .map_err(|e| IndexerError::selector(HEADING_SELECTOR, e))?;
        let project_title = Selector::parse(&selectors.project_title)
            .map_err(|e| IndexerError::selector(&selectors.project_title, e))?;

        Ok(Self {
            headings,
            project_title,
        })
    }

    /// Extracts the section identified by `fragment` from `page`
    ///
    /// # Algorithm
    ///
    /// 1. Locate the element whose `id` equals the fragment
    /// 2. Use the first heading (`h1`-`h6`, the element itself included) as title
    /// 3. Flatten the subtree text as body
    /// 4. Parse manual and version from the project title chrome
    ///
    /// Permalink glyphs are removed from title and body. Every field is
    /// trimmed; inner whitespace is kept as rendered.
    ///
    /// # Errors
    ///
    /// `IndexerError::FragmentNotFound` if no element carries the fragment id.
    pub fn extract_section(
        &self,
        page: &FetchedPage,
        fragment: &str,
    ) -> Result<SectionContent, IndexerError> {
        let document = page.document();

        let mut source_uri = page.url.clone();
        source_uri.set_fragment(Some(fragment));

        let section = find_by_id(&document, fragment).ok_or_else(|| {
            IndexerError::FragmentNotFound {
                url: page.url.to_string(),
                fragment: fragment.to_string(),
            }
        })?;

        let title = match self.first_heading(section) {
            Some(heading) => strip_glyphs(&element_text(heading)),
            None => {
                tracing::debug!("Section {} has no heading", source_uri);
                String::new()
            }
        };

        let ProjectTitle { manual, version } = self.project_title(&document);
        if manual.is_empty() && version.is_empty() {
            tracing::warn!("No manual name or version found on {}", page.url);
        }

        Ok(SectionContent {
            title,
            body_text: strip_glyphs(&element_text(section)),
            manual,
            version,
            source_uri: source_uri.to_string(),
        }
        .trimmed())
    }

    fn first_heading<'a>(&self, section: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if HEADING_TAGS.contains(&section.value().name()) {
            return Some(section);
        }
        section.select(&self.headings).next()
    }

    /// Reads the page chrome with markup replaced by whitespace
    fn project_title(&self, document: &Html) -> ProjectTitle {
        document
            .select(&self.project_title)
            .next()
            .map(|element| {
                let text = element.text().collect::<Vec<_>>().join(" ");
                parse_project_title(&text)
            })
            .unwrap_or_default()
    }
}

/// Finds the element carrying the given `id` attribute
///
/// Walks the tree instead of building an `#id` selector, so ids that are not
/// valid CSS identifiers still match.
fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().id() == Some(id))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Removes every permalink glyph
///
/// Inner whitespace is left as rendered, so preformatted blocks keep their
/// line structure; fields are trimmed once the section is assembled.
fn strip_glyphs(text: &str) -> String {
    text.replace(PERMALINK_GLYPH, "")
}
