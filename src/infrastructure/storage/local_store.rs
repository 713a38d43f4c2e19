use std::path::{Path, PathBuf};

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Staging directory on local disk, rooted at `base_path`.
pub struct LocalStagingStore {
    fs: LocalFileSystem,
    base_path: PathBuf,
}

impl LocalStagingStore {
    /// Creates `base_path` if needed.
    pub fn new(base_path: PathBuf) -> Result<Self, StagingStoreError> {
        std::fs::create_dir_all(&base_path).map_err(|e| {
            StagingStoreError::Unavailable(format!("{}: {}", base_path.display(), e))
        })?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StagingStoreError::Unavailable(e.to_string()))?;

        Ok(Self { fs, base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(path: &StoragePath) -> ObjectPath {
        ObjectPath::from(path.as_str())
    }
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    async fn store(&self, path: &StoragePath, data: Bytes) -> Result<u64, StagingStoreError> {
        let size = data.len() as u64;

        self.fs
            .put(&Self::object_path(path), PutPayload::from(data))
            .await
            .map_err(|e| StagingStoreError::Write {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(path = %path, bytes = size, "Upload staged");
        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, StagingStoreError> {
        let read_error = |e: object_store::Error| match e {
            object_store::Error::NotFound { .. } => StagingStoreError::Missing(path.clone()),
            other => StagingStoreError::Read {
                path: path.clone(),
                reason: other.to_string(),
            },
        };

        let object = self
            .fs
            .get(&Self::object_path(path))
            .await
            .map_err(read_error)?;
        object.bytes().await.map_err(read_error)
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        match self.fs.delete(&Self::object_path(path)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StagingStoreError::Delete {
                path: path.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
