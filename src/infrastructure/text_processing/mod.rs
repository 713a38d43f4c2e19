mod composite_document_reader;
mod mock_document_reader;
mod pdf_adapter;
mod plain_text_adapter;
mod text_sanitizer;

pub use composite_document_reader::CompositeDocumentReader;
pub use mock_document_reader::MockDocumentReader;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use text_sanitizer::normalize_page_text;
