use md5::{Digest, Md5};
use serde::Serialize;
use std::fmt;

/// A story extracted from the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Visible title of the story
    pub title: String,

    /// Target of the title anchor (absolute URL or site-relative path)
    pub link: String,

    /// Reference to the discussion page, relative to the site root
    #[serde(rename = "comments")]
    pub comments_ref: Option<String>,
}

impl Entry {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        comments_ref: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            comments_ref,
        }
    }

    /// Identity of this entry; titles, not URLs, decide duplicates
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.title)
    }
}

/// MD5 digest of a story title, hex encoded
///
/// Used both as the dedup key and as the story's archive directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(title: &str) -> Self {
        let digest = Md5::digest(title.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
