mod knowledge_base_file;
mod local_store;

pub use knowledge_base_file::FileKnowledgeBaseStore;
pub use local_store::LocalStagingStore;
