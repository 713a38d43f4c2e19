use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use policy_advisor::application::ports::{
    DocumentReadError, DocumentReader, KnowledgeBaseStore, LlmClientError, SamplingConfig,
};
use policy_advisor::application::services::{BuildError, KnowledgeBaseBuilder};
use policy_advisor::domain::{ContentType, Document};
use policy_advisor::infrastructure::llm::MockLlmClient;
use policy_advisor::infrastructure::storage::FileKnowledgeBaseStore;
use policy_advisor::infrastructure::text_processing::{CompositeDocumentReader, MockDocumentReader};

struct Fixture {
    dir: TempDir,
    llm: Arc<MockLlmClient>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            llm: Arc::new(MockLlmClient::new("SUMMARY OF PRODUCTS")),
        }
    }

    fn documents_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    fn output_file(&self) -> std::path::PathBuf {
        self.dir.path().join("kb_summary.txt")
    }

    fn write_document(&self, name: &str, contents: &[u8]) {
        std::fs::create_dir_all(self.documents_dir()).unwrap();
        std::fs::write(self.documents_dir().join(name), contents).unwrap();
    }

    fn builder(&self, reader: Arc<dyn DocumentReader>) -> KnowledgeBaseBuilder<MockLlmClient> {
        KnowledgeBaseBuilder::new(
            reader,
            Arc::clone(&self.llm),
            Arc::new(FileKnowledgeBaseStore::new(self.output_file())),
            self.documents_dir(),
            SamplingConfig::default(),
        )
    }

    fn default_builder(&self) -> KnowledgeBaseBuilder<MockLlmClient> {
        self.builder(Arc::new(
            MockDocumentReader::new().with_text(ContentType::Pdf, "BRAVO-PLAN from the brochure"),
        ))
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn given_pdf_and_text_documents_when_building_then_summary_written_verbatim() {
    let fixture = Fixture::new();
    fixture.write_document("a.txt", b"ALPHA-PLAN covers travel");
    fixture.write_document("b.pdf", b"%PDF-1.4 fake");

    let report = fixture.default_builder().build().await.unwrap();

    assert_eq!(report.documents_processed, 2);
    assert_eq!(report.documents_skipped, 0);

    let requests = fixture.llm.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("ALPHA-PLAN covers travel"));
    assert!(requests[0].prompt.contains("BRAVO-PLAN from the brochure"));
    assert!(requests[0].attachment.is_none());

    assert_eq!(read(&fixture.output_file()), "SUMMARY OF PRODUCTS");
    assert_eq!(report.summary_chars, "SUMMARY OF PRODUCTS".len());
}

#[tokio::test]
async fn given_documents_when_building_then_corpus_follows_file_name_order() {
    let fixture = Fixture::new();
    fixture.write_document("b.txt", b"SECOND-DOC");
    fixture.write_document("a.txt", b"FIRST-DOC");
    fixture.write_document("c.txt", b"THIRD-DOC");

    fixture.default_builder().build().await.unwrap();

    let prompt = &fixture.llm.requests()[0].prompt;
    let first = prompt.find("FIRST-DOC").unwrap();
    let second = prompt.find("SECOND-DOC").unwrap();
    let third = prompt.find("THIRD-DOC").unwrap();
    assert!(first < second && second < third);
    assert!(prompt.contains("FIRST-DOC\n\nSECOND-DOC\n\nTHIRD-DOC"));
}

#[tokio::test]
async fn given_empty_directory_when_building_then_fails_and_leaves_existing_output() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(fixture.documents_dir()).unwrap();
    std::fs::write(fixture.output_file(), "PREVIOUS SUMMARY").unwrap();

    let result = fixture.default_builder().build().await;

    assert!(matches!(result, Err(BuildError::EmptyCorpus)));
    assert_eq!(fixture.llm.generate_calls(), 0);
    assert_eq!(read(&fixture.output_file()), "PREVIOUS SUMMARY");
}

#[tokio::test]
async fn given_missing_directory_when_building_then_creates_it_and_reports_empty_corpus() {
    let fixture = Fixture::new();
    assert!(!fixture.documents_dir().exists());

    let result = fixture.default_builder().build().await;

    assert!(matches!(result, Err(BuildError::EmptyCorpus)));
    assert!(fixture.documents_dir().is_dir());
    assert!(!fixture.output_file().exists());
}

#[tokio::test]
async fn given_whitespace_only_documents_when_building_then_reports_empty_corpus() {
    let fixture = Fixture::new();
    fixture.write_document("blank.txt", b"  \n\t\n ");

    let result = fixture.default_builder().build().await;

    assert!(matches!(result, Err(BuildError::EmptyCorpus)));
    assert_eq!(fixture.llm.generate_calls(), 0);
}

#[tokio::test]
async fn given_unsupported_files_when_building_then_skips_them() {
    let fixture = Fixture::new();
    fixture.write_document("plans.txt", b"GOLD-PLAN");
    fixture.write_document("notes.docx", b"IGNORED-DOCX");
    fixture.write_document("call.mp3", b"IGNORED-AUDIO");
    fixture.write_document("SHOUTING.TXT", b"IGNORED-UPPERCASE");
    std::fs::create_dir_all(fixture.documents_dir().join("nested.txt")).unwrap();

    let report = fixture.default_builder().build().await.unwrap();

    assert_eq!(report.documents_processed, 1);
    assert_eq!(report.documents_skipped, 3);
    let prompt = &fixture.llm.requests()[0].prompt;
    assert!(prompt.contains("GOLD-PLAN"));
    assert!(!prompt.contains("IGNORED"));
}

struct NoTextForPdf;

#[async_trait]
impl DocumentReader for NoTextForPdf {
    async fn read_text(
        &self,
        data: &[u8],
        doc: &Document,
    ) -> Result<String, DocumentReadError> {
        match doc.content_type {
            ContentType::Pdf => Err(DocumentReadError::NoText(doc.filename.clone())),
            _ => Ok(String::from_utf8_lossy(data).into_owned()),
        }
    }
}

#[tokio::test]
async fn given_scanned_pdf_without_text_when_building_then_continues_with_other_documents() {
    let fixture = Fixture::new();
    fixture.write_document("scan.pdf", b"%PDF-1.4 image only");
    fixture.write_document("terms.txt", b"SILVER-PLAN");

    let report = fixture.builder(Arc::new(NoTextForPdf)).build().await.unwrap();

    assert_eq!(report.documents_processed, 2);
    assert!(fixture.llm.requests()[0].prompt.contains("SILVER-PLAN"));
}

#[tokio::test]
async fn given_undecodable_text_file_when_building_then_fails_with_file_name() {
    let fixture = Fixture::new();
    fixture.write_document("broken.txt", &[0xff, 0xfe, 0x00, 0xc3]);

    let result = fixture.default_builder().build().await;

    match result {
        Err(BuildError::Extraction { filename, .. }) => assert_eq!(filename, "broken.txt"),
        other => panic!("expected extraction error, got {other:?}"),
    }
    assert_eq!(fixture.llm.generate_calls(), 0);
}

#[tokio::test]
async fn given_model_failure_when_building_then_returns_generation_error_and_keeps_old_output() {
    let fixture = Fixture::new();
    fixture.write_document("plans.txt", b"GOLD-PLAN");
    std::fs::write(fixture.output_file(), "PREVIOUS SUMMARY").unwrap();
    fixture.llm.push_result(Err(LlmClientError::RateLimited));

    let result = fixture.default_builder().build().await;

    assert!(matches!(
        result,
        Err(BuildError::Generation(LlmClientError::RateLimited))
    ));
    assert_eq!(fixture.llm.generate_calls(), 1);
    assert_eq!(read(&fixture.output_file()), "PREVIOUS SUMMARY");
}

#[tokio::test]
async fn given_existing_output_when_building_then_replaces_it_whole() {
    let fixture = Fixture::new();
    fixture.write_document("plans.txt", b"GOLD-PLAN");
    std::fs::write(fixture.output_file(), "A MUCH LONGER PREVIOUS SUMMARY TEXT").unwrap();

    fixture.default_builder().build().await.unwrap();

    let store = FileKnowledgeBaseStore::new(fixture.output_file());
    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.as_str(), "SUMMARY OF PRODUCTS");
}

#[tokio::test]
async fn given_real_pdf_and_text_files_when_building_with_document_readers_then_both_reach_model() {
    let fixture = Fixture::new();
    fixture.write_document("brochure.pdf", include_bytes!("../infrastructure/fixtures/sample.pdf"));
    fixture.write_document("plans.txt", b"Travel Guard\r\ncovers lost luggage");
    fixture.write_document(".txt", b"Pet Care Basic");

    let report = fixture
        .builder(Arc::new(CompositeDocumentReader::for_documents()))
        .build()
        .await
        .unwrap();

    assert_eq!(report.documents_processed, 3);
    let prompt = &fixture.llm.requests()[0].prompt;
    let pet = prompt.find("Pet Care Basic").expect("dot-txt file text");
    let brochure = prompt.find("Term Life Plus").expect("pdf page one");
    let second_page = prompt.find("Home Shield").expect("pdf page two");
    let plans = prompt.find("Travel Guard\ncovers lost luggage").expect("txt text");
    assert!(pet < brochure && brochure < second_page && second_page < plans);
}
