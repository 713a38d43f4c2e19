use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::LlmClient;
use crate::application::services::{KnowledgeBaseBuilder, RecommendationService, SessionRegistry};

pub struct AppState<L>
where
    L: LlmClient,
{
    pub knowledge_base_builder: Arc<KnowledgeBaseBuilder<L>>,
    pub recommendation_service: Arc<RecommendationService<L>>,
    pub sessions: Arc<SessionRegistry>,
    /// Held while a rebuild runs; a second rebuild is refused, not queued.
    pub rebuild_lock: Arc<Mutex<()>>,
    pub max_upload_bytes: usize,
}

impl<L> AppState<L>
where
    L: LlmClient,
{
    pub fn new(
        knowledge_base_builder: Arc<KnowledgeBaseBuilder<L>>,
        recommendation_service: Arc<RecommendationService<L>>,
        max_upload_bytes: usize,
    ) -> Self {
        let idle_after = recommendation_service.governor().policy().cooldown;
        Self {
            knowledge_base_builder,
            recommendation_service,
            sessions: Arc::new(SessionRegistry::with_idle_after(idle_after)),
            rebuild_lock: Arc::new(Mutex::new(())),
            max_upload_bytes,
        }
    }
}

impl<L> Clone for AppState<L>
where
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            knowledge_base_builder: Arc::clone(&self.knowledge_base_builder),
            recommendation_service: Arc::clone(&self.recommendation_service),
            sessions: Arc::clone(&self.sessions),
            rebuild_lock: Arc::clone(&self.rebuild_lock),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
