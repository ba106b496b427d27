//! Local file-system content store backed by `tokio::fs`

use crate::storage::traits::{ByteStream, ContentStore, StorageError, StorageResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Content store writing directly to the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContentStore;

impl FsContentStore {
    pub fn new() -> Self {
        Self
    }

    async fn create_parent(&self, path: &Path) -> StorageResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.ensure_dir(parent).await,
            _ => Ok(()),
        }
    }
}

/// Drains `body` into `file`, closing the handle before returning
async fn copy_body(mut file: File, path: &Path, mut body: ByteStream) -> StorageResult<u64> {
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| StorageError::Interrupted {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| StorageError::io(path, e))?;
    Ok(written)
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn ensure_dir(&self, path: &Path) -> StorageResult<()> {
        if self.is_dir(path).await {
            return Ok(());
        }
        fs::create_dir_all(path)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    async fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn write_stream(&self, path: &Path, body: ByteStream) -> StorageResult<u64> {
        self.create_parent(path).await?;

        let file = File::create(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        match copy_body(file, path, body).await {
            Ok(written) => Ok(written),
            Err(e) => {
                // A file is only left behind for a complete body
                if let Err(remove_err) = fs::remove_file(path).await {
                    if remove_err.kind() != ErrorKind::NotFound {
                        tracing::warn!(
                            "Failed to remove partial file {}: {}",
                            path.display(),
                            remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn write_bytes(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        self.create_parent(path).await?;
        fs::write(path, contents)
            .await
            .map_err(|e| StorageError::io(path, e))
    }
}
