use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::sync::Barrier;

use policy_advisor::application::ports::{
    LlmClientError, SamplingConfig, StagingStore, StagingStoreError,
};
use policy_advisor::application::services::{
    AnalysisError, RecommendationService, RequestGovernor, SessionContext,
};
use policy_advisor::domain::{AudioFormat, AudioUpload, StoragePath};
use policy_advisor::infrastructure::llm::MockLlmClient;
use policy_advisor::infrastructure::storage::{FileKnowledgeBaseStore, LocalStagingStore};

const KNOWLEDGE_BASE: &str = "PRODUCT: Family Shield\nIDEAL FOR: parents with young children";

struct Fixture {
    dir: TempDir,
    llm: Arc<MockLlmClient>,
    service: RecommendationService<MockLlmClient>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_client(MockLlmClient::new("Recommended: Family Shield"))
    }

    fn with_client(llm: MockLlmClient) -> Self {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(llm);
        let service = RecommendationService::new(
            Arc::clone(&llm),
            Arc::new(FileKnowledgeBaseStore::new(dir.path().join("kb_summary.txt"))),
            Arc::new(LocalStagingStore::new(dir.path().join("staging")).unwrap()),
            RequestGovernor::default(),
            SamplingConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(800),
                ..SamplingConfig::default()
            },
        );
        Self { dir, llm, service }
    }

    fn write_knowledge_base(&self, text: &str) {
        std::fs::write(self.dir.path().join("kb_summary.txt"), text).unwrap();
    }

    fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("staging"))
            .unwrap()
            .count()
    }
}

fn recording(filename: &str) -> AudioUpload {
    AudioUpload::new(
        filename.to_string(),
        AudioFormat::from_filename(filename).unwrap(),
        Bytes::from_static(b"ID3 fake audio frames"),
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
}

#[tokio::test]
async fn given_knowledge_base_when_analyzing_then_returns_model_report_and_removes_staged_file() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let session = SessionContext::new("s1");

    let recommendation = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await
        .unwrap();

    assert_eq!(recommendation.report, "Recommended: Family Shield");
    assert_eq!(recommendation.generated_on, today());
    assert_eq!(fixture.staged_file_count(), 0);
}

#[tokio::test]
async fn given_recording_when_analyzing_then_uploads_it_with_its_media_type() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let session = SessionContext::new("s1");

    fixture
        .service
        .analyze_on(&session, recording("Call.WAV"), today())
        .await
        .unwrap();

    let uploads = fixture.llm.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].display_name, "Call.WAV");
    assert_eq!(uploads[0].mime_type, "audio/wav");
    assert_eq!(uploads[0].size_bytes, b"ID3 fake audio frames".len());
}

#[tokio::test]
async fn given_knowledge_base_when_analyzing_then_prompt_carries_date_and_knowledge_base() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let session = SessionContext::new("s1");

    fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await
        .unwrap();

    let requests = fixture.llm.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.prompt.starts_with("TODAY'S DATE: March 05, 2025\n"));
    assert!(request.prompt.contains(KNOWLEDGE_BASE));
    assert_eq!(request.attachment.as_ref().unwrap().mime_type, "audio/mpeg");
    assert_eq!(request.sampling.temperature, Some(0.0));
    assert_eq!(request.sampling.max_output_tokens, Some(800));
}

#[tokio::test]
async fn given_no_knowledge_base_when_analyzing_then_refuses_without_touching_provider() {
    let fixture = Fixture::new();
    let session = SessionContext::new("s1");

    let result = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    assert!(matches!(result, Err(AnalysisError::MissingKnowledgeBase)));
    assert!(fixture.llm.uploads().is_empty());
    assert_eq!(fixture.llm.generate_calls(), 0);
}

#[tokio::test]
async fn given_whitespace_knowledge_base_when_analyzing_then_treated_as_missing() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(" \n\n ");
    let session = SessionContext::new("s1");

    let result = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    assert!(matches!(result, Err(AnalysisError::MissingKnowledgeBase)));
}

#[tokio::test]
async fn given_refused_for_missing_knowledge_base_when_retrying_then_not_in_cooldown() {
    let fixture = Fixture::new();
    let session = SessionContext::new("s1");

    let first = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;
    assert!(matches!(first, Err(AnalysisError::MissingKnowledgeBase)));

    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let second = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    assert!(second.is_ok());
}

#[tokio::test]
async fn given_recent_analysis_when_analyzing_again_then_blocked_by_cooldown() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let session = SessionContext::new("s1");

    fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await
        .unwrap();
    let second = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    match second {
        Err(AnalysisError::CooldownActive { remaining_secs }) => assert!(remaining_secs <= 10),
        other => panic!("expected cooldown, got {other:?}"),
    }
    assert_eq!(fixture.llm.generate_calls(), 1);
    assert_eq!(fixture.llm.uploads().len(), 1);
}

#[tokio::test]
async fn given_two_sessions_when_analyzing_back_to_back_then_cooldowns_are_independent() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let first_session = SessionContext::new("s1");
    let second_session = SessionContext::new("s2");

    let first = fixture
        .service
        .analyze_on(&first_session, recording("call.mp3"), today())
        .await;
    let second = fixture
        .service
        .analyze_on(&second_session, recording("call.mp3"), today())
        .await;

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn given_upload_failure_when_analyzing_then_reports_upload_error_and_removes_staged_file() {
    let fixture = Fixture::with_client(MockLlmClient::default().failing_uploads());
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    let session = SessionContext::new("s1");

    let result = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    assert!(matches!(
        result,
        Err(AnalysisError::Upload(LlmClientError::UploadFailed(_)))
    ));
    assert_eq!(fixture.llm.generate_calls(), 0);
    assert_eq!(fixture.staged_file_count(), 0);
}

#[tokio::test]
async fn given_provider_error_when_analyzing_then_fails_without_retry_and_removes_staged_file() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    fixture
        .llm
        .push_result(Err(LlmClientError::ApiRequestFailed("HTTP 500".to_string())));
    let session = SessionContext::new("s1");

    let result = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    assert!(matches!(
        result,
        Err(AnalysisError::Generation(LlmClientError::ApiRequestFailed(_)))
    ));
    assert_eq!(fixture.llm.generate_calls(), 1);
    assert_eq!(fixture.staged_file_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn given_persistent_rate_limit_when_analyzing_then_quota_exceeded_after_three_attempts() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    for _ in 0..3 {
        fixture.llm.push_result(Err(LlmClientError::RateLimited));
    }
    let session = SessionContext::new("s1");

    let result = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await;

    assert!(matches!(result, Err(AnalysisError::QuotaExceeded)));
    assert_eq!(fixture.llm.generate_calls(), 3);
    assert_eq!(fixture.llm.uploads().len(), 1);
    assert_eq!(fixture.staged_file_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn given_transient_rate_limit_when_analyzing_then_succeeds_on_retry() {
    let fixture = Fixture::new();
    fixture.write_knowledge_base(KNOWLEDGE_BASE);
    fixture.llm.push_result(Err(LlmClientError::RateLimited));
    let session = SessionContext::new("s1");

    let recommendation = fixture
        .service
        .analyze_on(&session, recording("call.mp3"), today())
        .await
        .unwrap();

    assert_eq!(recommendation.report, "Recommended: Family Shield");
    assert_eq!(fixture.llm.generate_calls(), 2);
}

/// Holds every `store` until two have completed, so two uploads are staged at
/// the same time before either is read back.
struct RendezvousStagingStore {
    inner: LocalStagingStore,
    barrier: Barrier,
}

#[async_trait::async_trait]
impl StagingStore for RendezvousStagingStore {
    async fn store(&self, path: &StoragePath, data: Bytes) -> Result<u64, StagingStoreError> {
        let size = self.inner.store(path, data).await?;
        self.barrier.wait().await;
        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, StagingStoreError> {
        self.inner.fetch(path).await
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        self.inner.delete(path).await
    }
}

#[tokio::test]
async fn given_concurrent_same_name_uploads_when_analyzing_then_recordings_stay_apart() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("kb_summary.txt"), KNOWLEDGE_BASE).unwrap();
    let llm = Arc::new(MockLlmClient::new("Recommended: Family Shield"));
    let staging = RendezvousStagingStore {
        inner: LocalStagingStore::new(dir.path().join("staging")).unwrap(),
        barrier: Barrier::new(2),
    };
    let service = RecommendationService::new(
        Arc::clone(&llm),
        Arc::new(FileKnowledgeBaseStore::new(dir.path().join("kb_summary.txt"))),
        Arc::new(staging),
        RequestGovernor::default(),
        SamplingConfig::default(),
    );
    let alice = SessionContext::new("alice");
    let bob = SessionContext::new("bob");
    let upload = |data: &'static [u8]| {
        AudioUpload::new("call.mp3".to_string(), AudioFormat::Mp3, Bytes::from_static(data))
    };

    let (first, second) = tokio::join!(
        service.analyze_on(&alice, upload(b"ABCD"), today()),
        service.analyze_on(&bob, upload(b"0123456789"), today()),
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    let mut sizes: Vec<usize> = llm.uploads().iter().map(|u| u.size_bytes).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![4, 10]);
    assert_eq!(
        std::fs::read_dir(dir.path().join("staging")).unwrap().count(),
        0
    );
}
