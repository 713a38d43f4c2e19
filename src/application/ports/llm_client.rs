use async_trait::async_trait;
use bytes::Bytes;

/// Boundary to the hosted generative model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Uploads an artifact to the provider so later requests can reference it.
    async fn upload_file(
        &self,
        display_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<FileReference, LlmClientError>;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmClientError>;
}

/// Provider-side handle of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub attachment: Option<FileReference>,
    pub sampling: SamplingConfig,
}

impl GenerationRequest {
    pub fn text(prompt: String, sampling: SamplingConfig) -> Self {
        Self {
            prompt,
            attachment: None,
            sampling,
        }
    }

    pub fn with_attachment(mut self, attachment: FileReference) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("file upload failed: {0}")]
    UploadFailed(String),
}
