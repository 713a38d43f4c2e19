mod gemini_client;
mod mock_llm_client;

pub use gemini_client::{DEFAULT_BASE_URL, GeminiClient};
pub use mock_llm_client::{MockLlmClient, UploadRecord};
