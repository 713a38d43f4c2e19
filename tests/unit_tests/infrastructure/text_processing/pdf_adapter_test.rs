use std::time::Duration;

use policy_advisor::application::ports::{DocumentReadError, DocumentReader};
use policy_advisor::domain::{ContentType, Document};
use policy_advisor::infrastructure::text_processing::PdfAdapter;

fn document(filename: &str, content_type: ContentType, data: &[u8]) -> Document {
    Document::new(filename.to_string(), content_type, data.len() as u64)
}

#[tokio::test]
async fn given_valid_pdf_bytes_when_reading_then_returns_text_of_every_page_in_order() {
    let pdf_bytes = include_bytes!("../fixtures/sample.pdf");
    let doc = document("sample.pdf", ContentType::Pdf, pdf_bytes);

    let text = PdfAdapter::new().read_text(pdf_bytes, &doc).await.unwrap();

    let first = text.find("Term Life Plus").expect("first page text");
    let second = text.find("Home Shield").expect("second page text");
    assert!(first < second);
    assert!(text[first..second].contains("\n\n"));
}

#[tokio::test]
async fn given_pdf_without_text_when_reading_then_returns_no_text() {
    let pdf_bytes = include_bytes!("../fixtures/empty.pdf");
    let doc = document("empty.pdf", ContentType::Pdf, pdf_bytes);

    let result = PdfAdapter::new().read_text(pdf_bytes, &doc).await;

    match result {
        Err(DocumentReadError::NoText(filename)) => assert_eq!(filename, "empty.pdf"),
        other => panic!("expected no text, got {other:?}"),
    }
}

#[tokio::test]
async fn given_corrupt_bytes_when_reading_pdf_then_reports_malformed_file() {
    let data = b"this is not a pdf at all";
    let doc = document("broken.pdf", ContentType::Pdf, data);

    let result = PdfAdapter::new().read_text(data, &doc).await;

    assert!(matches!(result, Err(DocumentReadError::Malformed { .. })));
}

#[tokio::test]
async fn given_generous_timeout_when_reading_pdf_then_completes() {
    let pdf_bytes = include_bytes!("../fixtures/sample.pdf");
    let doc = document("sample.pdf", ContentType::Pdf, pdf_bytes);

    let result = PdfAdapter::with_timeout(Duration::from_secs(60))
        .read_text(pdf_bytes, &doc)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn given_text_document_when_reading_with_pdf_adapter_then_unsupported() {
    let doc = document("plans.txt", ContentType::Text, b"hello");

    let result = PdfAdapter::default().read_text(b"hello", &doc).await;

    assert!(matches!(
        result,
        Err(DocumentReadError::Unsupported(ContentType::Text))
    ));
}
