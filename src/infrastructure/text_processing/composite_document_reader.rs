use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{DocumentReadError, DocumentReader};
use crate::domain::{ContentType, Document};

use super::pdf_adapter::PdfAdapter;
use super::plain_text_adapter::PlainTextAdapter;

/// Dispatches on the document's content type.
pub struct CompositeDocumentReader {
    readers: HashMap<ContentType, Arc<dyn DocumentReader>>,
}

impl CompositeDocumentReader {
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }

    pub fn with_reader(
        mut self,
        content_type: ContentType,
        reader: Arc<dyn DocumentReader>,
    ) -> Self {
        self.readers.insert(content_type, reader);
        self
    }

    /// Readers for the product documents the knowledge base is built from.
    pub fn for_documents() -> Self {
        Self::new()
            .with_reader(ContentType::Pdf, Arc::new(PdfAdapter::new()))
            .with_reader(ContentType::Text, Arc::new(PlainTextAdapter))
    }

    pub fn supports(&self, content_type: ContentType) -> bool {
        self.readers.contains_key(&content_type)
    }
}

impl Default for CompositeDocumentReader {
    fn default() -> Self {
        Self::for_documents()
    }
}

#[async_trait]
impl DocumentReader for CompositeDocumentReader {
    async fn read_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, DocumentReadError> {
        match self.readers.get(&document.content_type) {
            Some(reader) => reader.read_text(data, document).await,
            None => Err(DocumentReadError::Unsupported(document.content_type)),
        }
    }
}
