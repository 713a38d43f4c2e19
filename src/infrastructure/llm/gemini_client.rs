use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    FileReference, GenerationRequest, LlmClient, LlmClientError, SamplingConfig,
};
use crate::infrastructure::observability::sanitize_prompt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Google Gemini REST adapter: `generateContent` plus the Files API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn from_sampling(sampling: &SamplingConfig) -> Option<Self> {
        if *sampling == SamplingConfig::default() {
            return None;
        }
        Some(Self {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
            max_output_tokens: sampling.max_output_tokens,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Serialize)]
struct UploadMetadata {
    file: UploadFileMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadFileMetadata {
    display_name: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    name: String,
    uri: String,
    mime_type: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = vec![Part {
            text: Some(request.prompt.clone()),
            ..Part::default()
        }];

        if let Some(attachment) = &request.attachment {
            parts.push(Part {
                file_data: Some(FileData {
                    mime_type: attachment.mime_type.clone(),
                    file_uri: attachment.uri.clone(),
                }),
                ..Part::default()
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig::from_sampling(&request.sampling),
        }
    }

    fn response_text(response: GenerateContentResponse) -> Result<String, LlmClientError> {
        let block_reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(LlmClientError::InvalidResponse(match block_reason {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "no candidates".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(LlmClientError::InvalidResponse(format!(
                "candidate has no text (finish reason: {reason})"
            )));
        }

        Ok(text)
    }
}

async fn ensure_success(response: Response) -> Result<Response, LlmClientError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmClientError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmClientError::ApiRequestFailed(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    Ok(response)
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn upload_file(
        &self,
        display_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<FileReference, LlmClientError> {
        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadMetadata {
                file: UploadFileMetadata {
                    display_name: display_name.to_string(),
                },
            })
            .send()
            .await
            .map_err(|e| LlmClientError::UploadFailed(format!("start: {}", e)))?;
        let start = ensure_success(start).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                LlmClientError::InvalidResponse("upload session url missing".to_string())
            })?;

        let finish = self
            .client
            .post(&session_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await
            .map_err(|e| LlmClientError::UploadFailed(format!("finalize: {}", e)))?;
        let finish = ensure_success(finish).await?;

        let uploaded: UploadResponse = finish
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        tracing::debug!(file = %uploaded.file.name, "File uploaded to Gemini");

        Ok(FileReference {
            name: uploaded.file.name,
            uri: uploaded.file.uri,
            mime_type: uploaded
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        })
    }

    #[tracing::instrument(
        skip(self, request),
        fields(model = %self.model, prompt_chars = request.prompt.len())
    )]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmClientError> {
        let body = Self::build_request(request);
        tracing::debug!(
            prompt = %sanitize_prompt(&request.prompt),
            has_attachment = request.attachment.is_some(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;
        let response = ensure_success(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let text = Self::response_text(parsed)?;
        tracing::info!(chars = text.len(), "Gemini generation completed");

        Ok(text)
    }
}
