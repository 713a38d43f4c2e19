mod knowledge_base_builder;
mod prompts;
mod recommendation_service;
mod request_governor;
mod session_registry;

pub use knowledge_base_builder::{BuildError, BuildReport, KnowledgeBaseBuilder};
pub use prompts::{knowledge_base_prompt, recommendation_prompt};
pub use recommendation_service::{AnalysisError, RecommendationService};
pub use request_governor::{
    CooldownCheck, DEFAULT_COOLDOWN, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, GovernorError,
    GovernorPolicy, RequestGovernor,
};
pub use session_registry::{ANONYMOUS_SESSION, SessionContext, SessionRegistry};
