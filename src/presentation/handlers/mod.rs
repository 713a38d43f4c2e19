mod analysis;
mod error_response;
mod health;
mod knowledge_base;

pub use analysis::analysis_handler;
pub use error_response::{ErrorResponse, error_response};
pub use health::health_handler;
pub use knowledge_base::{knowledge_base_status_handler, rebuild_knowledge_base_handler};
