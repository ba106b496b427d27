//! Storage traits and error types
//!
//! This module defines the file-system capability the crawler writes
//! archives through, and its associated error types.

use crate::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Download interrupted while writing {}: {source}", .path.display())]
    Interrupted { path: PathBuf, source: FetchError },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A body delivered as a sequence of byte chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Trait for content store implementations
///
/// Implementations must be safe to share between concurrently running
/// entry workflows. Callers guarantee that no two tasks write the same path.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Creates `path` and any missing parents; succeeds if it already exists
    async fn ensure_dir(&self, path: &Path) -> StorageResult<()>;

    /// Returns true if `path` exists and is a directory
    async fn is_dir(&self, path: &Path) -> bool;

    /// Writes every chunk of `body` to `path`, replacing any existing file
    ///
    /// Parent directories are created as needed. Returns the number of bytes
    /// written. On error no file is left at `path`.
    async fn write_stream(&self, path: &Path, body: ByteStream) -> StorageResult<u64>;

    /// Writes `contents` to `path` in one piece
    async fn write_bytes(&self, path: &Path, contents: &[u8]) -> StorageResult<()>;
}
