use std::io;
use std::path::Path;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio_util::io::ReaderStream;

use crate::domain::StoragePath;

/// Object store shared by all stages, keyed by `<stream_id>/<relative_path>`.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
        content_length: Option<u64>,
    ) -> Result<u64, MediaStoreError>;

    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<(), MediaStoreError>;

    async fn get(&self, path: &StoragePath) -> Result<Bytes, MediaStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError>;

    async fn head(&self, path: &StoragePath) -> Result<u64, MediaStoreError>;

    /// Copies an object inside the store without passing its bytes through
    /// the caller.
    async fn copy(&self, from: &StoragePath, to: &StoragePath) -> Result<(), MediaStoreError>;

    /// Streams a local file into the store; returns the number of bytes written.
    async fn upload_file(&self, path: &StoragePath, local: &Path) -> Result<u64, MediaStoreError> {
        let file = tokio::fs::File::open(local).await?;
        let content_length = file.metadata().await.ok().map(|m| m.len());
        let stream = ReaderStream::new(file).boxed();
        self.store(path, stream, content_length).await
    }

    async fn download_file(
        &self,
        path: &StoragePath,
        local: &Path,
    ) -> Result<u64, MediaStoreError> {
        let data = self.get(path).await?;
        tokio::fs::write(local, &data).await?;
        Ok(data.len() as u64)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("store configuration invalid: {0}")]
    Configuration(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
