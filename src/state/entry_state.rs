/// Entry state definitions for tracking a story through the crawl
///
/// Every story discovered on the listing page moves through these states
/// exactly once per run.
use std::fmt;

/// Represents the current state of a story entry in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    // ===== Active States =====
    /// Entry was extracted from the listing page
    Discovered,

    /// Entry won the fingerprint claim and will be archived by this task
    Claimed,

    /// The story's primary page is being downloaded
    Downloading,

    /// The discussion thread's outbound links are being downloaded
    ArchivingComments,

    // ===== Terminal States =====
    /// All downloads for this entry have been attempted
    Done,

    /// The primary page could not be archived
    Failed,
}

impl EntryState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// ```text
    /// Discovered -> Claimed -> Downloading -> ArchivingComments -> Done
    ///                          Downloading -> Done      (no comments page)
    ///                          Downloading | ArchivingComments -> Failed
    /// ```
    pub fn can_transition_to(&self, next: EntryState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Claimed)
                | (Self::Claimed, Self::Downloading)
                | (Self::Downloading, Self::ArchivingComments)
                | (Self::Downloading, Self::Done)
                | (Self::Downloading, Self::Failed)
                | (Self::ArchivingComments, Self::Done)
                | (Self::ArchivingComments, Self::Failed)
        )
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Claimed => "claimed",
            Self::Downloading => "downloading",
            Self::ArchivingComments => "archiving_comments",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible entry states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Discovered,
            Self::Claimed,
            Self::Downloading,
            Self::ArchivingComments,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
