use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::application::services::AnalysisError;
use crate::domain::{AudioFormat, AudioUpload};
use crate::infrastructure::observability::SESSION_ID_HEADER;
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub report: String,
    pub generated_on: String,
}

#[derive(Serialize)]
pub struct CooldownResponse {
    pub error: String,
    pub remaining_secs: u64,
}

#[tracing::instrument(skip(state, headers, multipart))]
pub async fn analysis_handler<L>(
    State(state): State<AppState<L>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response
where
    L: LlmClient + 'static,
{
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok());
    let session = state.sessions.session(session_id);

    let upload = match read_audio_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    tracing::debug!(
        session_id = %session.id(),
        filename = %upload.filename,
        bytes = upload.data.len(),
        "Audio upload received"
    );

    match state.recommendation_service.analyze(&session, upload).await {
        Ok(recommendation) => (
            StatusCode::OK,
            Json(AnalysisResponse {
                report: recommendation.report,
                generated_on: recommendation.generated_on.to_string(),
            }),
        )
            .into_response(),
        Err(e) => analysis_error_response(e),
    }
}

async fn read_audio_upload(mut multipart: Multipart) -> Result<AudioUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                tracing::warn!("Analysis request with no file");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "No audio file uploaded",
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                ));
            }
        };

        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };

        let Some(format) = AudioFormat::from_filename(&filename) else {
            tracing::warn!(filename = %filename, "Unsupported audio format");
            return Err(error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!(
                    "Unsupported audio format: {}. Expected mp3, wav, m4a or aac",
                    filename
                ),
            ));
        };

        let data = field.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read file bytes");
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to read file: {}", e),
            )
        })?;

        if data.is_empty() {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Uploaded audio file is empty",
            ));
        }

        return Ok(AudioUpload::new(filename, format, data));
    }
}

fn analysis_error_response(error: AnalysisError) -> Response {
    match error {
        AnalysisError::MissingKnowledgeBase => error_response(
            StatusCode::CONFLICT,
            "Please rebuild the knowledge base first.",
        ),
        AnalysisError::CooldownActive { remaining_secs } => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(CooldownResponse {
                    error: format!(
                        "Please wait {} seconds before running again.",
                        remaining_secs
                    ),
                    remaining_secs,
                }),
            )
                .into_response();
            // Retry-After must be at least one second to be useful.
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(remaining_secs.max(1)),
            );
            response
        }
        AnalysisError::QuotaExceeded => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, error.to_string())
        }
        AnalysisError::Upload(_) | AnalysisError::Generation(_) => {
            error_response(StatusCode::BAD_GATEWAY, format!("Analysis Error: {}", error))
        }
        AnalysisError::Staging(_) | AnalysisError::KnowledgeBase(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Analysis Error: {}", error),
        ),
    }
}
