use std::collections::HashMap;

use crate::application::ports::{DocumentReadError, DocumentReader};
use crate::domain::{ContentType, Document};

/// Returns a canned text per content type, falling back to the bytes as UTF-8.
#[derive(Default)]
pub struct MockDocumentReader {
    canned: HashMap<ContentType, String>,
}

impl MockDocumentReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, content_type: ContentType, text: impl Into<String>) -> Self {
        self.canned.insert(content_type, text.into());
        self
    }
}

#[async_trait::async_trait]
impl DocumentReader for MockDocumentReader {
    async fn read_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, DocumentReadError> {
        match self.canned.get(&document.content_type) {
            Some(text) => Ok(text.clone()),
            None => String::from_utf8(data.to_vec())
                .map_err(|e| DocumentReadError::malformed(document, e)),
        }
    }
}
