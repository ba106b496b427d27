//! Storage module for writing story archives
//!
//! This module handles everything that touches the output directory:
//! - The `ContentStore` capability and its file-system implementation
//! - The on-disk layout of a story archive
//! - Rendering of the per-story manifest
//!
//! # Layout
//!
//! ```text
//! <out-root>/<fingerprint>/readme          (optional manifest)
//! <out-root>/<fingerprint>/main.html       (primary page bytes)
//! <out-root>/<fingerprint>/comment_<n>.html
//! ```

mod fs;
mod traits;

pub use fs::FsContentStore;
pub use traits::{ByteStream, ContentStore, StorageError, StorageResult};

use crate::state::{Entry, Fingerprint};
use std::path::{Path, PathBuf};

/// File name of the primary page inside a story archive
pub const MAIN_PAGE_FILE: &str = "main.html";

/// File name of the manifest inside a story archive
pub const MANIFEST_FILE: &str = "readme";

/// Paths making up one story archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryArchive {
    dir: PathBuf,
}

impl StoryArchive {
    /// Archive for `fingerprint` under the output root
    pub fn new(out_root: &Path, fingerprint: &Fingerprint) -> Self {
        Self {
            dir: out_root.join(fingerprint.as_str()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn main_page(&self) -> PathBuf {
        self.dir.join(MAIN_PAGE_FILE)
    }

    pub fn manifest(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Path of the `index`-th comment link artifact
    pub fn comment(&self, index: usize) -> PathBuf {
        self.dir.join(format!("comment_{}.html", index))
    }
}

/// Renders the manifest for an entry as pretty-printed JSON
///
/// # Example
///
/// ```
/// use story_archiver::state::Entry;
/// use story_archiver::storage::render_manifest;
///
/// let entry = Entry::new("Example Story", "/item?id=1", Some("item?id=1".to_string()));
/// let manifest = render_manifest(&entry).unwrap();
/// assert!(manifest.contains("\"title\": \"Example Story\""));
/// ```
pub fn render_manifest(entry: &Entry) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(entry)?)
}
