//! Crawler module for fetching and archiving stories
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of text bodies and byte streams
//! - Extraction of listing entries and discussion links
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{extract_comment_links, extract_entries, is_absolute_http};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::ArchiverError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Ensure the output root exists
/// 2. Fetch the listing page and extract its entries
/// 3. Archive every unique entry concurrently
/// 4. Return the run report
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran to completion (individual entries may have failed)
/// * `Err(ArchiverError)` - No entries could be discovered
pub async fn crawl(config: Config) -> Result<CrawlReport, ArchiverError> {
    run_crawl(config).await
}
