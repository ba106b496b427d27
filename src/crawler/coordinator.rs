//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl pipeline that coordinates:
//! - Fetching the listing page and extracting entries
//! - Claiming fingerprints so each story is archived once
//! - Fanning out one workflow per entry
//! - Downloading each story's primary page, then its comment links
//! - Folding every workflow's outcome into the run report

use crate::config::{validate, Config};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{extract_comment_links, extract_entries, is_absolute_http};
use crate::output::{CrawlReport, EntryOutcome, StoryOutcome};
use crate::state::{ClaimSet, Entry, EntryState};
use crate::storage::{render_manifest, ContentStore, FsContentStore, StoryArchive};
use crate::{ArchiverError, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Main crawler coordinator structure
///
/// Holds the state of one crawl session: the output root and the set of
/// claimed fingerprints. Discarded when the crawl ends.
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    store: Arc<dyn ContentStore>,
    claims: ClaimSet,
    root_url: Url,
    out_root: PathBuf,
}

impl Coordinator {
    /// Creates a coordinator writing to the local file system
    pub fn new(config: Config) -> Result<Self> {
        Self::with_store(config, Arc::new(FsContentStore::new()))
    }

    /// Creates a coordinator writing through `store`
    pub fn with_store(config: Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        validate(&config)?;

        let root_url = Url::parse(&config.crawler.root_url)?;
        let fetcher = Fetcher::from_config(&config.user_agent, &config.crawler)?;
        let out_root = PathBuf::from(&config.output.directory);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            store,
            claims: ClaimSet::new(),
            root_url,
            out_root,
        })
    }

    pub fn out_root(&self) -> &Path {
        &self.out_root
    }

    /// Runs the crawl to completion
    ///
    /// Fails only when no entries can be discovered: the output root cannot
    /// be created, the listing page cannot be fetched, or it has no listing
    /// rows. Failures inside an entry's workflow are logged and counted in
    /// the report.
    pub async fn run(&self) -> Result<CrawlReport> {
        let start_time = Instant::now();
        tracing::info!(
            root = %self.root_url,
            out = %self.out_root.display(),
            period = %self.config.output.period,
            "Starting crawl"
        );

        self.store.ensure_dir(&self.out_root).await?;

        let listing = self.fetcher.fetch_text(self.root_url.as_str()).await?;
        let entries = extract_entries(&listing)?;
        tracing::info!("Found {} entries on the listing page", entries.len());

        let outcomes: Vec<EntryOutcome> = stream::iter(entries)
            .map(|entry| self.process_entry(entry))
            .buffer_unordered(self.config.crawler.max_concurrent_entries)
            .collect()
            .await;

        let report = CrawlReport::from_outcomes(&outcomes, start_time.elapsed());
        tracing::info!("Crawl completed: {}", report);
        Ok(report)
    }

    /// Runs the workflow of a single entry
    ///
    /// Never fails: errors are logged and recorded in the outcome.
    async fn process_entry(&self, entry: Entry) -> EntryOutcome {
        let fingerprint = entry.fingerprint();

        if !self.claims.try_claim(&fingerprint) {
            tracing::debug!(%fingerprint, title = %entry.title, "Dropping duplicate entry");
            return EntryOutcome::Duplicate(fingerprint);
        }

        tracing::info!(
            %fingerprint,
            comments = ?entry.comments_ref,
            "News found: {}",
            entry.title
        );

        let mut outcome = StoryOutcome::new(fingerprint, entry.title.clone());
        if let Err(e) = self.archive_entry(&entry, &mut outcome).await {
            tracing::error!(title = %entry.title, error = %e, "Entry workflow aborted");
            outcome.state = EntryState::Failed;
        }

        EntryOutcome::Finished(outcome)
    }

    async fn archive_entry(&self, entry: &Entry, outcome: &mut StoryOutcome) -> Result<()> {
        advance(outcome, EntryState::Claimed)?;
        advance(outcome, EntryState::Downloading)?;

        let archive = StoryArchive::new(&self.out_root, &outcome.fingerprint);

        if let Err(e) = self.download_primary(entry, &archive).await {
            tracing::warn!(link = %entry.link, error = %e, "Failed to process {}", entry.link);
            return advance(outcome, EntryState::Failed);
        }

        let Some(comments_ref) = entry.comments_ref.as_deref() else {
            return advance(outcome, EntryState::Done);
        };

        advance(outcome, EntryState::ArchivingComments)?;
        let (saved, failed) = self.archive_comments(&archive, comments_ref).await;
        outcome.comment_links_saved = saved;
        outcome.comment_links_failed = failed;

        advance(outcome, EntryState::Done)
    }

    /// Writes the manifest (when enabled) and then streams the primary page
    /// into `main.html`
    async fn download_primary(&self, entry: &Entry, archive: &StoryArchive) -> Result<()> {
        let url = self.resolve(&entry.link)?;

        self.store.ensure_dir(archive.dir()).await?;

        if self.config.crawler.write_manifest {
            let manifest = render_manifest(entry)?;
            self.store
                .write_bytes(&archive.manifest(), manifest.as_bytes())
                .await?;
        }

        let body = self.fetcher.fetch_stream(url.as_str()).await?;
        let written = self.store.write_stream(&archive.main_page(), body).await?;
        tracing::debug!(%url, bytes = written, "Saved primary page");

        Ok(())
    }

    /// Downloads every outbound link of the discussion page concurrently
    ///
    /// Returns the number of links saved and failed. A discussion page that
    /// cannot be fetched or parsed counts as having no links.
    async fn archive_comments(&self, archive: &StoryArchive, comments_ref: &str) -> (usize, usize) {
        let links = match self.comment_links(comments_ref).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(comments = comments_ref, error = %e, "Failed to read comments page");
                return (0, 0);
            }
        };

        if links.is_empty() {
            tracing::debug!(comments = comments_ref, "No outbound comment links");
            return (0, 0);
        }

        let results: Vec<bool> = stream::iter(links.into_iter().enumerate())
            .map(|(index, link)| self.download_comment(archive.comment(index), link))
            .buffer_unordered(self.config.crawler.max_concurrent_downloads)
            .collect()
            .await;

        let saved = results.iter().filter(|ok| **ok).count();
        (saved, results.len() - saved)
    }

    async fn comment_links(&self, comments_ref: &str) -> Result<Vec<String>> {
        let url = self.resolve(comments_ref)?;
        let html = self.fetcher.fetch_text(url.as_str()).await?;
        Ok(extract_comment_links(&html)?)
    }

    async fn download_comment(&self, path: PathBuf, link: String) -> bool {
        match self.save_link(&path, &link).await {
            Ok(bytes) => {
                tracing::debug!(url = %link, bytes, "Saved comment link");
                true
            }
            Err(e) => {
                tracing::warn!(url = %link, error = %e, "Failed to process {}", link);
                false
            }
        }
    }

    async fn save_link(&self, path: &Path, link: &str) -> Result<u64> {
        let body = self.fetcher.fetch_stream(link).await?;
        Ok(self.store.write_stream(path, body).await?)
    }

    /// Resolves a listing reference to an absolute URL
    ///
    /// Absolute http(s) links are used as they are; anything else is
    /// relative to the site root.
    pub fn resolve(&self, link: &str) -> Result<Url> {
        if is_absolute_http(link) {
            Ok(Url::parse(link)?)
        } else {
            Ok(self.root_url.join(link)?)
        }
    }
}

/// Moves `outcome` to `next`, rejecting transitions the state machine forbids
fn advance(outcome: &mut StoryOutcome, next: EntryState) -> Result<()> {
    if !outcome.state.can_transition_to(next) {
        return Err(ArchiverError::InvalidTransition {
            from: outcome.state,
            to: next,
        });
    }
    tracing::trace!(fingerprint = %outcome.fingerprint, from = %outcome.state, to = %next, "Entry transition");
    outcome.state = next;
    Ok(())
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use story_archiver::config::Config;
/// use story_archiver::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
