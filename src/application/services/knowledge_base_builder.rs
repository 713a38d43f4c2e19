use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{
    DocumentReadError, DocumentReader, GenerationRequest, KnowledgeBaseStore,
    KnowledgeBaseStoreError, LlmClient, LlmClientError, SamplingConfig,
};
use crate::domain::{ContentType, Document, KnowledgeBase};

use super::prompts::knowledge_base_prompt;

pub struct KnowledgeBaseBuilder<L>
where
    L: LlmClient,
{
    document_reader: Arc<dyn DocumentReader>,
    llm_client: Arc<L>,
    store: Arc<dyn KnowledgeBaseStore>,
    documents_dir: PathBuf,
    sampling: SamplingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub corpus_chars: usize,
    pub summary_chars: usize,
}

impl<L> KnowledgeBaseBuilder<L>
where
    L: LlmClient,
{
    pub fn new(
        document_reader: Arc<dyn DocumentReader>,
        llm_client: Arc<L>,
        store: Arc<dyn KnowledgeBaseStore>,
        documents_dir: PathBuf,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            document_reader,
            llm_client,
            store,
            documents_dir,
            sampling,
        }
    }

    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    /// Extracts every `.pdf` and `.txt` file (in file-name order), has the model
    /// summarize the result and replaces the stored knowledge base with it.
    #[tracing::instrument(skip(self), fields(documents_dir = %self.documents_dir.display()))]
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        tokio::fs::create_dir_all(&self.documents_dir)
            .await
            .map_err(BuildError::DocumentsDir)?;

        let mut parts = Vec::new();
        let mut documents_processed = 0;
        let mut documents_skipped = 0;

        for path in self.list_documents().await? {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let content_type = match ContentType::from_path(&path) {
                Some(ct) => ct,
                None => {
                    tracing::debug!(filename = %filename, "Skipping unsupported document");
                    documents_skipped += 1;
                    continue;
                }
            };

            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| BuildError::ReadDocument {
                    filename: filename.clone(),
                    source,
                })?;
            let document = Document::new(filename.clone(), content_type, data.len() as u64);

            match self.document_reader.read_text(&data, &document).await {
                Ok(text) => {
                    tracing::debug!(filename = %filename, chars = text.len(), "Document read");
                    if !text.trim().is_empty() {
                        parts.push(text);
                    }
                }
                Err(DocumentReadError::NoText(_)) => {
                    tracing::warn!(filename = %filename, "Document has no extractable text");
                }
                Err(source) => return Err(BuildError::Extraction { filename, source }),
            }
            documents_processed += 1;
        }

        let corpus = parts.join("\n\n");
        if corpus.trim().is_empty() {
            tracing::warn!(documents_processed, "No text found in documents");
            return Err(BuildError::EmptyCorpus);
        }

        tracing::info!(
            documents_processed,
            corpus_chars = corpus.len(),
            "Generating knowledge base summary"
        );

        let request = GenerationRequest::text(knowledge_base_prompt(&corpus), self.sampling);
        let summary = self
            .llm_client
            .generate(&request)
            .await
            .map_err(BuildError::Generation)?;

        let knowledge_base = KnowledgeBase::new(summary);
        self.store.save(&knowledge_base).await?;

        let report = BuildReport {
            documents_processed,
            documents_skipped,
            corpus_chars: corpus.len(),
            summary_chars: knowledge_base.len(),
        };
        tracing::info!(summary_chars = report.summary_chars, "Knowledge base saved");

        Ok(report)
    }

    async fn list_documents(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut entries = tokio::fs::read_dir(&self.documents_dir)
            .await
            .map_err(BuildError::DocumentsDir)?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(BuildError::DocumentsDir)? {
            let path = entry.path();
            // metadata() follows symlinks, file_type() would not
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no text found in documents")]
    EmptyCorpus,
    #[error("documents directory: {0}")]
    DocumentsDir(std::io::Error),
    #[error("reading {filename}: {source}")]
    ReadDocument {
        filename: String,
        source: std::io::Error,
    },
    #[error("extracting {filename}: {source}")]
    Extraction {
        filename: String,
        source: DocumentReadError,
    },
    #[error("generation: {0}")]
    Generation(LlmClientError),
    #[error("storage: {0}")]
    Storage(#[from] KnowledgeBaseStoreError),
}
