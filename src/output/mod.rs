//! Output module for crawl results
//!
//! This module handles:
//! - Recording the outcome of every entry workflow
//! - Aggregating outcomes into a per-run report
//! - Printing the report at the end of a run

pub mod report;

pub use report::{print_report, CrawlReport, EntryOutcome, StoryOutcome};
