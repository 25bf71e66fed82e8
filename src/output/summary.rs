//! Run summary formatting
//!
//! Turns an [`IndexRunResult`] into the text printed at the end of a run.

use crate::crawler::IndexRunResult;
use crate::search::IndexDocument;
use std::fmt::Write;

/// Maximum characters of section content shown per dry-run document
const PREVIEW_CHARS: usize = 120;

/// Formats the summary of an indexing run
pub fn format_summary(result: &IndexRunResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Manual Indexing Summary ===\n");
    let _ = writeln!(out, "Manual:  {}", result.manual_url);
    let _ = writeln!(out, "Sitemap: {}", result.sitemap_url);
    for (manual, version) in &result.editions {
        let _ = writeln!(out, "Edition: {} ({})", manual, version);
    }
    let _ = writeln!(
        out,
        "Started: {}",
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Duration: {:.1}s\n",
        result.duration().num_milliseconds() as f64 / 1000.0
    );

    let _ = writeln!(out, "Sections indexed: {}", result.indexed);
    let _ = writeln!(out, "Links skipped:    {}", result.skipped);
    let _ = writeln!(out, "Links failed:     {}", result.failed());
    let _ = writeln!(out, "Stale retracted:  {}", result.retracted);

    if !result.errors.is_empty() {
        let _ = writeln!(out, "\nFailures:");
        for failure in &result.errors {
            let _ = writeln!(out, "  - {}: {}", failure.url, failure.error);
        }
    }

    out
}

/// Prints the summary of an indexing run to stdout
pub fn print_summary(result: &IndexRunResult) {
    print!("{}", format_summary(result));
}

/// Formats documents collected during a dry run
pub fn format_documents(documents: &[IndexDocument]) -> String {
    let mut out = String::new();

    for doc in documents {
        let _ = writeln!(out, "[{}] {}", doc.id, doc.body.title);
        let _ = writeln!(out, "  manual:  {} ({})", doc.body.manual, doc.body.version);
        let _ = writeln!(out, "  uri:     {}", doc.body.uri);
        let _ = writeln!(out, "  content: {}", preview(&doc.body.content));
    }

    out
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
