//! HTML parsing for the listing page and discussion pages
//!
//! Both extractors are pure functions of the page markup:
//! - [`extract_entries`]: listing page -> story entries
//! - [`extract_comment_links`]: discussion page -> outbound URLs

use crate::state::Entry;
use crate::{ParseError, ParseResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A listing row holding one submission
const SUBMISSION_ROW: &str = "tr.athing.submission";

/// The story anchor: a direct child of the title container
const TITLE_LINK: &str = "span.titleline > a";

/// Container holding a discussion thread
const COMMENT_TREE: &str = "table.comment-tree";

const ANCHOR: &str = "a[href]";

/// Visible text marking the discussion link in a metadata row
const COMMENTS_MARKER: &str = "comments";

fn selector(css: &str) -> ParseResult<Selector> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{}: {}", css, e)))
}

/// Extracts story entries from a listing page
///
/// # Extraction Rules
///
/// - Every `tr.athing.submission` row is a candidate
/// - The title anchor is the first `<a>` that is a direct child of
///   `span.titleline`; nested anchors (e.g. the site badge) are ignored
/// - Rows without a title anchor, or whose anchor has no `href` or no
///   text, are skipped
/// - The row's next element sibling, if it is a `<tr>`, is the metadata
///   row; the last anchor in it whose text contains `comments` supplies
///   `comments_ref`
///
/// # Errors
///
/// Returns `ParseError::MissingElement` when the page contains no
/// submission rows at all, since no entries can then be discovered.
///
/// # Example
///
/// ```
/// use story_archiver::crawler::extract_entries;
///
/// let html = r#"<table>
///   <tr class="athing submission"><td><span class="titleline"><a href="/item?id=1">Example Story</a></span></td></tr>
///   <tr><td><a href="item?id=1">5 comments</a></td></tr>
/// </table>"#;
/// let entries = extract_entries(html).unwrap();
/// assert_eq!(entries[0].title, "Example Story");
/// assert_eq!(entries[0].comments_ref.as_deref(), Some("item?id=1"));
/// ```
pub fn extract_entries(html: &str) -> ParseResult<Vec<Entry>> {
    let document = Html::parse_document(html);
    let row_selector = selector(SUBMISSION_ROW)?;
    let title_selector = selector(TITLE_LINK)?;
    let anchor_selector = selector(ANCHOR)?;

    let mut rows = document.select(&row_selector).peekable();
    if rows.peek().is_none() {
        return Err(ParseError::MissingElement {
            what: format!("listing rows matching '{}'", SUBMISSION_ROW),
        });
    }

    let mut entries = Vec::new();
    for row in rows {
        let Some(anchor) = row.select(&title_selector).next() else {
            tracing::debug!("Skipping listing row without a title link");
            continue;
        };
        let Some(link) = anchor.value().attr("href") else {
            continue;
        };
        // Fingerprinted as rendered, surrounding whitespace included
        let title = anchor.text().collect::<String>();
        if title.trim().is_empty() {
            continue;
        }

        let comments_ref = metadata_row(row).and_then(|meta| {
            meta.select(&anchor_selector)
                .filter(|a| a.text().collect::<String>().contains(COMMENTS_MARKER))
                .filter_map(|a| a.value().attr("href"))
                .last()
                .map(str::to_string)
        });

        entries.push(Entry::new(title, link, comments_ref));
    }

    Ok(entries)
}

/// The element immediately following `row`, if it is a table row
fn metadata_row(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|sibling| sibling.value().name() == "tr")
}

/// Extracts outbound links from a discussion page
///
/// Only anchors inside `table.comment-tree` are considered. Targets that are
/// not absolute http(s) URLs are internal navigation and are dropped.
/// Duplicates are removed, keeping first-seen order. A page without the
/// container yields no links.
///
/// # Example
///
/// ```
/// use story_archiver::crawler::extract_comment_links;
///
/// let html = r#"<table class="comment-tree">
///   <tr><td><a href="https://example.com/paper">paper</a> <a href="reply?id=2">reply</a></td></tr>
/// </table>"#;
/// assert_eq!(extract_comment_links(html).unwrap(), vec!["https://example.com/paper"]);
/// ```
pub fn extract_comment_links(html: &str) -> ParseResult<Vec<String>> {
    let document = Html::parse_document(html);
    let tree_selector = selector(COMMENT_TREE)?;
    let anchor_selector = selector(ANCHOR)?;

    let Some(tree) = document.select(&tree_selector).next() else {
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let links: Vec<String> = tree
        .select(&anchor_selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_absolute_http(href))
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect();

    Ok(links)
}

/// Returns true if `href` carries its own http or https scheme
pub fn is_absolute_http(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}
