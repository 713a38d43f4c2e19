use bytes::Bytes;

use crate::domain::StoragePath;

/// Short-lived holding area for uploads between receipt and hand-off to the
/// model provider.
#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    /// Writes `data` at `path`, replacing an existing object. Returns the byte count.
    async fn store(&self, path: &StoragePath, data: Bytes) -> Result<u64, StagingStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, StagingStoreError>;

    /// Removing an object that is already gone succeeds.
    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("staging area unavailable: {0}")]
    Unavailable(String),
    #[error("nothing staged at {0}")]
    Missing(StoragePath),
    #[error("writing {path}: {reason}")]
    Write { path: StoragePath, reason: String },
    #[error("reading {path}: {reason}")]
    Read { path: StoragePath, reason: String },
    #[error("removing {path}: {reason}")]
    Delete { path: StoragePath, reason: String },
}
