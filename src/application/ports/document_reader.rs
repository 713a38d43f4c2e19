use async_trait::async_trait;

use crate::domain::{ContentType, Document};

/// Turns the raw bytes of one product document into plain text.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read_text(&self, data: &[u8], document: &Document)
    -> Result<String, DocumentReadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentReadError {
    #[error("no reader for {}", .0.as_mime())]
    Unsupported(ContentType),
    #[error("{filename} is malformed: {reason}")]
    Malformed { filename: String, reason: String },
    #[error("reading {0} timed out")]
    TimedOut(String),
    /// The document parsed but carries no text, e.g. a scanned PDF.
    #[error("no text found in {0}")]
    NoText(String),
}

impl DocumentReadError {
    pub fn malformed(document: &Document, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            filename: document.filename.clone(),
            reason: reason.to_string(),
        }
    }
}
