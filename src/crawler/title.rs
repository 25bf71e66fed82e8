//! Manual name and version parsing
//!
//! Rendered manuals show their identity in the page chrome as
//! `"<Manual Name> (<version>)"`. The version slot is the last
//! whitespace-delimited token; the word `latest` is removed from the name slot.
//!
//! A manual whose name legitimately contains the word `latest` loses it here.

/// Manual identity parsed from the page chrome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectTitle {
    pub manual: String,
    pub version: String,
}

/// Marker removed from the manual name slot
const LATEST_MARKER: &str = "latest";

/// Parses the plain-text project title into manual name and version
///
/// # Examples
///
/// ```
/// use manual_indexer::crawler::parse_project_title;
///
/// let title = parse_project_title("Core APIs (10.4)");
/// assert_eq!(title.manual, "Core APIs");
/// assert_eq!(title.version, "10.4");
///
/// let title = parse_project_title("Core APIs (latest)");
/// assert_eq!(title.version, "latest");
/// ```
pub fn parse_project_title(text: &str) -> ProjectTitle {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let Some((last, rest)) = tokens.split_last() else {
        return ProjectTitle::default();
    };

    let version = last.trim_matches(|c| c == '(' || c == ')').to_string();
    let manual = normalize_whitespace(&rest.join(" ").replace(LATEST_MARKER, ""));

    ProjectTitle { manual, version }
}

/// Collapses every whitespace run to a single space and trims both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
