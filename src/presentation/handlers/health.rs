use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub knowledge_base_ready: bool,
    pub active_sessions: usize,
}

/// Liveness probe. Always 200 while the process serves; an unreadable
/// knowledge base is reported as not ready.
pub async fn health_handler<L>(State(state): State<AppState<L>>) -> Json<HealthResponse>
where
    L: LlmClient + 'static,
{
    let knowledge_base_ready = matches!(
        state.recommendation_service.knowledge_base().await,
        Ok(Some(_))
    );

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        knowledge_base_ready,
        active_sessions: state.sessions.len(),
    })
}
