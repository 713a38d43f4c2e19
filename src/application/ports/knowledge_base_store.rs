use async_trait::async_trait;

use crate::domain::KnowledgeBase;

#[async_trait]
pub trait KnowledgeBaseStore: Send + Sync {
    /// `Ok(None)` when the knowledge base has not been built yet.
    async fn load(&self) -> Result<Option<KnowledgeBase>, KnowledgeBaseStoreError>;

    /// Replaces any previous knowledge base.
    async fn save(&self, knowledge_base: &KnowledgeBase) -> Result<(), KnowledgeBaseStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseStoreError {
    #[error("failed to read knowledge base: {0}")]
    ReadFailed(String),
    #[error("failed to write knowledge base: {0}")]
    WriteFailed(String),
}
