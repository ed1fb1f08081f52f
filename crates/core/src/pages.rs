//! Page range selection.
//!
//! A range expression is a comma-separated list of tokens, each a single page
//! (`"5"`) or a span (`"2-4"`). Spans are clamped into `[1, total]`. An open
//! start (`"-3"`) means page 1; an open end (`"7-"`) means the start page.
//! A bound is open only when empty, so `"x-3"` and `"-"` select nothing.
//! Tokens that select nothing are dropped with a warning.

use std::collections::BTreeSet;

use tracing::{debug, warn};

/// Resolve a range expression against a document of `total_pages` pages.
///
/// A blank expression selects every page. Otherwise the result holds exactly the
/// valid pages the expression names and may be empty (`"abc"` selects nothing).
pub fn resolve_pages(spec: &str, total_pages: u32) -> BTreeSet<u32> {
    if spec.trim().is_empty() {
        return all_pages(total_pages);
    }

    let mut pages = BTreeSet::new();

    for token in spec.split(',').map(str::trim) {
        if token.contains('-') {
            let bounds: Vec<&str> = token.split('-').collect();
            if bounds.len() != 2 {
                warn!(token, "Malformed page span, skipping");
                continue;
            }

            let (start, end) = match (parse_bound(bounds[0]), parse_bound(bounds[1])) {
                (Ok(None), Ok(None)) | (Err(_), _) | (_, Err(_)) => {
                    warn!(token, "Unparseable page span, skipping");
                    continue;
                }
                (Ok(start), Ok(end)) => {
                    let start = start.unwrap_or(1);
                    (start, end.unwrap_or(start))
                }
            };
            let first = start.max(1);
            let last = end.min(i64::from(total_pages));

            if first <= last {
                // both bounds lie within [1, total_pages]
                pages.extend((first..=last).map(|p| p as u32));
            } else {
                warn!(
                    start,
                    end, total_pages, "Page span selects no pages of the document, skipping"
                );
            }
        } else {
            match token.parse::<u32>() {
                Ok(page) if (1..=total_pages).contains(&page) => {
                    pages.insert(page);
                }
                _ => {
                    warn!(token, total_pages, "Invalid page number, skipping");
                }
            }
        }
    }

    debug!(spec, ?pages, "Resolved page range");
    pages
}

/// Like [`resolve_pages`], but an empty result falls back to every page.
pub fn resolve_pages_or_all(spec: &str, total_pages: u32) -> BTreeSet<u32> {
    let pages = resolve_pages(spec, total_pages);
    if pages.is_empty() {
        warn!(spec, "Page range selects nothing, printing all pages");
        all_pages(total_pages)
    } else {
        pages
    }
}

/// An empty bound is open (`None`); anything else must be an integer.
fn parse_bound(bound: &str) -> Result<Option<i64>, std::num::ParseIntError> {
    let bound = bound.trim();
    if bound.is_empty() {
        Ok(None)
    } else {
        bound.parse::<i64>().map(Some)
    }
}

fn all_pages(total_pages: u32) -> BTreeSet<u32> {
    (1..=total_pages).collect()
}
