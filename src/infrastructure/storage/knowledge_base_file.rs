use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::ports::{KnowledgeBaseStore, KnowledgeBaseStoreError};
use crate::domain::KnowledgeBase;

/// Knowledge base kept as a single UTF-8 text file.
pub struct FileKnowledgeBaseStore {
    path: PathBuf,
}

impl FileKnowledgeBaseStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Readers see either the old file or the new one, never a partial write.
    fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(contents.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl KnowledgeBaseStore for FileKnowledgeBaseStore {
    async fn load(&self) -> Result<Option<KnowledgeBase>, KnowledgeBaseStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(KnowledgeBase::new(text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KnowledgeBaseStoreError::ReadFailed(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    #[tracing::instrument(skip(self, knowledge_base), fields(path = %self.path.display()))]
    async fn save(&self, knowledge_base: &KnowledgeBase) -> Result<(), KnowledgeBaseStoreError> {
        let path = self.path.clone();
        let contents = knowledge_base.as_str().to_owned();

        tokio::task::spawn_blocking(move || Self::write_atomically(&path, &contents))
            .await
            .map_err(|e| KnowledgeBaseStoreError::WriteFailed(format!("task join error: {e}")))?
            .map_err(|e| KnowledgeBaseStoreError::WriteFailed(e.to_string()))?;

        tracing::debug!(bytes = knowledge_base.len(), "Knowledge base written");
        Ok(())
    }
}
