use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_media_store::{ObjectMediaStore, S3Options};

pub struct MediaStoreFactory;

impl MediaStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn MediaStore>, MediaStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                Ok(Arc::new(ObjectMediaStore::local(path)?))
            }
            StorageProviderSetting::S3 => {
                let bucket = settings.s3_bucket.clone().ok_or_else(|| {
                    MediaStoreError::Configuration("s3_bucket required".into())
                })?;
                let options = S3Options {
                    bucket,
                    region: settings.s3_region.clone(),
                    endpoint: settings.s3_endpoint.clone(),
                    access_key: settings.s3_access_key.clone(),
                    secret_key: settings.s3_secret_key.clone(),
                };
                Ok(Arc::new(ObjectMediaStore::s3(&options)?))
            }
            StorageProviderSetting::Memory => {
                tracing::warn!("Using in-memory media store, objects are lost on restart");
                Ok(Arc::new(ObjectMediaStore::in_memory()))
            }
        }
    }
}
