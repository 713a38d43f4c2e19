use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::application::services::BuildError;
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Serialize)]
pub struct KnowledgeBaseStatusResponse {
    pub ready: bool,
    pub size_bytes: usize,
}

#[derive(Serialize)]
pub struct RebuildResponse {
    pub message: String,
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub summary_chars: usize,
}

pub async fn knowledge_base_status_handler<L>(State(state): State<AppState<L>>) -> Response
where
    L: LlmClient + 'static,
{
    match state.recommendation_service.knowledge_base().await {
        Ok(knowledge_base) => (
            StatusCode::OK,
            Json(KnowledgeBaseStatusResponse {
                ready: knowledge_base.is_some(),
                size_bytes: knowledge_base.map(|kb| kb.len()).unwrap_or(0),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read knowledge base");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read knowledge base: {}", e),
            )
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn rebuild_knowledge_base_handler<L>(State(state): State<AppState<L>>) -> Response
where
    L: LlmClient + 'static,
{
    let Ok(_rebuilding) = state.rebuild_lock.try_lock() else {
        tracing::warn!("Rebuild requested while another is running");
        return error_response(
            StatusCode::CONFLICT,
            "Knowledge base rebuild already in progress",
        );
    };

    match state.knowledge_base_builder.build().await {
        Ok(report) => {
            tracing::info!(
                documents_processed = report.documents_processed,
                documents_skipped = report.documents_skipped,
                "Knowledge base rebuilt"
            );
            (
                StatusCode::OK,
                Json(RebuildResponse {
                    message: "Knowledge base rebuilt successfully.".to_string(),
                    documents_processed: report.documents_processed,
                    documents_skipped: report.documents_skipped,
                    summary_chars: report.summary_chars,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Knowledge base rebuild failed");
            let status = match e {
                BuildError::EmptyCorpus => StatusCode::UNPROCESSABLE_ENTITY,
                BuildError::Generation(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, format!("Failed to build knowledge base: {}", e))
        }
    }
}
