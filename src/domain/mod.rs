mod audio_upload;
mod cooldown_state;
mod document;
mod knowledge_base;
mod recommendation;
mod storage_path;

pub use audio_upload::{AudioFormat, AudioUpload};
pub use cooldown_state::CooldownState;
pub use document::{ContentType, Document};
pub use knowledge_base::KnowledgeBase;
pub use recommendation::Recommendation;
pub use storage_path::StoragePath;
