//! Per-run crawl report
//!
//! Every entry workflow ends in an [`EntryOutcome`]; the coordinator folds
//! them into a [`CrawlReport`] once all workflows have settled.

use crate::state::{EntryState, Fingerprint};
use std::fmt;
use std::time::Duration;

/// Final record of one claimed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryOutcome {
    pub fingerprint: Fingerprint,
    pub title: String,

    /// Terminal state reached by the workflow
    pub state: EntryState,

    /// Comment links written to the archive
    pub comment_links_saved: usize,

    /// Comment links whose download or write failed
    pub comment_links_failed: usize,
}

impl StoryOutcome {
    pub fn new(fingerprint: Fingerprint, title: impl Into<String>) -> Self {
        Self {
            fingerprint,
            title: title.into(),
            state: EntryState::Discovered,
            comment_links_saved: 0,
            comment_links_failed: 0,
        }
    }
}

/// How an entry extracted from the listing ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Another entry with the same title was claimed first
    Duplicate(Fingerprint),

    /// The entry was claimed and its workflow ran to a terminal state
    Finished(StoryOutcome),
}

/// Aggregate counts for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Entries extracted from the listing page
    pub discovered: usize,

    /// Entries dropped because their fingerprint was already claimed
    pub duplicates: usize,

    /// Entries that reached `Done`
    pub archived: usize,

    /// Entries that reached `Failed`
    pub failed: usize,

    pub comment_links_saved: usize,
    pub comment_links_failed: usize,

    pub elapsed: Duration,
}

impl CrawlReport {
    /// Folds entry outcomes into a report
    pub fn from_outcomes(outcomes: &[EntryOutcome], elapsed: Duration) -> Self {
        let mut report = Self {
            discovered: outcomes.len(),
            elapsed,
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                EntryOutcome::Duplicate(_) => report.duplicates += 1,
                EntryOutcome::Finished(story) => {
                    if story.state.is_success() {
                        report.archived += 1;
                    } else {
                        report.failed += 1;
                    }
                    report.comment_links_saved += story.comment_links_saved;
                    report.comment_links_failed += story.comment_links_failed;
                }
            }
        }

        report
    }

    /// A run succeeds when at least one entry was archived
    pub fn is_success(&self) -> bool {
        self.archived > 0
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} duplicates, {} archived, {} failed, \
             {} comment links saved, {} comment links failed in {:.2?}",
            self.discovered,
            self.duplicates,
            self.archived,
            self.failed,
            self.comment_links_saved,
            self.comment_links_failed,
            self.elapsed
        )
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("Entries:");
    println!("  Discovered: {}", report.discovered);
    println!("  Duplicates dropped: {}", report.duplicates);
    println!("  Archived: {}", report.archived);
    println!("  Failed: {}", report.failed);
    println!();
    println!("Comment links:");
    println!("  Saved: {}", report.comment_links_saved);
    println!("  Failed: {}", report.comment_links_failed);
    println!();
    println!("Elapsed: {:.2?}", report.elapsed);
}
