use async_trait::async_trait;

use crate::application::ports::{DocumentReadError, DocumentReader};
use crate::domain::{ContentType, Document};

/// Reader for `.txt` documents. The bytes must be UTF-8; line endings are
/// normalized to `\n` and the text is otherwise kept as written.
pub struct PlainTextAdapter;

impl PlainTextAdapter {
    fn normalize_line_endings(text: &str) -> String {
        if !text.contains('\r') {
            return text.to_owned();
        }
        text.replace("\r\n", "\n").replace('\r', "\n")
    }
}

#[async_trait]
impl DocumentReader for PlainTextAdapter {
    async fn read_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, DocumentReadError> {
        if document.content_type != ContentType::Text {
            return Err(DocumentReadError::Unsupported(document.content_type));
        }

        let text = std::str::from_utf8(data)
            .map_err(|e| DocumentReadError::malformed(document, format!("not UTF-8 ({e})")))?;

        Ok(Self::normalize_line_endings(text))
    }
}
