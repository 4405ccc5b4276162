use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};
use tokio::io::AsyncWriteExt;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StoragePath;

/// Connection details of an S3-compatible bucket.
#[derive(Debug, Clone, Default)]
pub struct S3Options {
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// [`MediaStore`] over any `object_store` backend.
pub struct ObjectMediaStore {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectMediaStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    pub fn local(base_path: PathBuf) -> Result<Self, MediaStoreError> {
        std::fs::create_dir_all(&base_path).map_err(MediaStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| MediaStoreError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(fs)))
    }

    pub fn s3(options: &S3Options) -> Result<Self, MediaStoreError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&options.bucket);
        if let Some(region) = &options.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &options.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        if let Some(key) = &options.access_key {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &options.secret_key {
            builder = builder.with_secret_access_key(secret);
        }
        let store = builder
            .build()
            .map_err(|e| MediaStoreError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }
}

fn read_error(e: object_store::Error) -> MediaStoreError {
    match e {
        object_store::Error::NotFound { path, .. } => MediaStoreError::NotFound(path),
        other => MediaStoreError::DownloadFailed(other.to_string()),
    }
}

#[async_trait::async_trait]
impl MediaStore for ObjectMediaStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(MediaStoreError::Io(e));
                }
            };
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(MediaStoreError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;

        tracing::debug!(path = %path, bytes = total_bytes, "Object stored");
        Ok(total_bytes)
    }

    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<(), MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, path: &StoragePath) -> Result<Bytes, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self.inner.get(&store_path).await.map_err(read_error)?;
        result
            .bytes()
            .await
            .map_err(|e| MediaStoreError::DownloadFailed(e.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| MediaStoreError::DeleteFailed(e.to_string()))
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        let meta = self.inner.head(&store_path).await.map_err(read_error)?;
        Ok(meta.size)
    }

    async fn copy(&self, from: &StoragePath, to: &StoragePath) -> Result<(), MediaStoreError> {
        let source = StorePath::from(from.as_str());
        let target = StorePath::from(to.as_str());
        self.inner.copy(&source, &target).await.map_err(|e| match e {
            object_store::Error::NotFound { path, .. } => MediaStoreError::NotFound(path),
            other => MediaStoreError::UploadFailed(other.to_string()),
        })?;
        tracing::debug!(from = %from, to = %to, "Object copied");
        Ok(())
    }

    async fn download_file(
        &self,
        path: &StoragePath,
        local: &Path,
    ) -> Result<u64, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut stream = self
            .inner
            .get(&store_path)
            .await
            .map_err(read_error)?
            .into_stream();
        let mut file = tokio::fs::File::create(local).await?;
        let mut total_bytes: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| MediaStoreError::DownloadFailed(e.to_string()))?;
            total_bytes += bytes.len() as u64;
            file.write_all(&bytes).await?;
        }
        file.flush().await?;
        Ok(total_bytes)
    }
}
