use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use crate::application::ports::{FileReference, GenerationRequest, LlmClient, LlmClientError};

/// Scriptable client: queued results are returned in order, then the default
/// answer. Every request is recorded.
pub struct MockLlmClient {
    default_answer: String,
    scripted: Mutex<VecDeque<Result<String, LlmClientError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    uploads: Mutex<Vec<UploadRecord>>,
    fail_uploads: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new("Mock answer")
    }
}

impl MockLlmClient {
    pub fn new(default_answer: impl Into<String>) -> Self {
        Self {
            default_answer: default_answer.into(),
            scripted: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            fail_uploads: false,
        }
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn push_result(&self, result: Result<String, LlmClientError>) {
        lock(&self.scripted).push_back(result);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    pub fn generate_calls(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        lock(&self.uploads).clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn upload_file(
        &self,
        display_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<FileReference, LlmClientError> {
        if self.fail_uploads {
            return Err(LlmClientError::UploadFailed("mock upload failure".to_string()));
        }

        let mut uploads = lock(&self.uploads);
        uploads.push(UploadRecord {
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: data.len(),
        });

        Ok(FileReference {
            name: format!("files/mock-{}", uploads.len()),
            uri: format!("mock://files/{}", uploads.len()),
            mime_type: mime_type.to_string(),
        })
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmClientError> {
        lock(&self.requests).push(request.clone());
        lock(&self.scripted)
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_answer.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
