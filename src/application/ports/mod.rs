mod document_reader;
mod knowledge_base_store;
mod llm_client;
mod staging_store;

pub use document_reader::{DocumentReadError, DocumentReader};
pub use knowledge_base_store::{KnowledgeBaseStore, KnowledgeBaseStoreError};
pub use llm_client::{FileReference, GenerationRequest, LlmClient, LlmClientError, SamplingConfig};
pub use staging_store::{StagingStore, StagingStoreError};
