use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;

use crate::application::ports::{DocumentReadError, DocumentReader};
use crate::domain::{ContentType, Document};

use super::text_sanitizer::normalize_page_text;

const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Text layer of a PDF, one normalized block per page. Pages without text are
/// left out; a document with no text at all is reported as such.
pub struct PdfAdapter {
    timeout: Duration,
}

impl Default for PdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAdapter {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_EXTRACTION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn read_pages(path: &Path) -> Result<Vec<String>, String> {
        let pdf = PdfDocument::open(path).map_err(|e| format!("cannot parse PDF: {e}"))?;
        let page_count = pdf
            .page_count()
            .map_err(|e| format!("cannot read page count: {e}"))?;

        let pages = (0..page_count)
            .filter_map(|page| match pdf.extract_text(page) {
                Ok(raw) => Some(normalize_page_text(&raw)),
                Err(e) => {
                    tracing::debug!(page, error = %e, "Skipping unreadable page");
                    None
                }
            })
            .filter(|text| !text.is_empty())
            .collect();

        Ok(pages)
    }
}

#[async_trait]
impl DocumentReader for PdfAdapter {
    #[tracing::instrument(
        skip(self, data),
        fields(filename = %document.filename, bytes = data.len())
    )]
    async fn read_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, DocumentReadError> {
        if document.content_type != ContentType::Pdf {
            return Err(DocumentReadError::Unsupported(document.content_type));
        }

        // pdf_oxide reads from a path, so the bytes go through a temp file.
        let mut spool = tempfile::NamedTempFile::new()
            .map_err(|e| DocumentReadError::malformed(document, format!("spool file: {e}")))?;
        spool
            .write_all(data)
            .map_err(|e| DocumentReadError::malformed(document, format!("spool file: {e}")))?;

        let extraction = tokio::task::spawn_blocking(move || Self::read_pages(spool.path()));
        let pages = match tokio::time::timeout(self.timeout, extraction).await {
            Err(_) => return Err(DocumentReadError::TimedOut(document.filename.clone())),
            Ok(Err(join_error)) => return Err(DocumentReadError::malformed(document, join_error)),
            Ok(Ok(result)) => {
                result.map_err(|reason| DocumentReadError::malformed(document, reason))?
            }
        };

        tracing::info!(pages = pages.len(), "PDF text extracted");

        if pages.is_empty() {
            return Err(DocumentReadError::NoText(document.filename.clone()));
        }

        Ok(pages.join("\n\n"))
    }
}
