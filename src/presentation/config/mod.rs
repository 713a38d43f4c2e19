mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment, UnknownEnvironment};
pub use settings::{
    API_KEY_VAR, AnalysisSettings, GovernorSettings, KnowledgeBaseSettings, LlmSettings,
    LoggingSettings, ServerSettings, Settings, SettingsError, StagingSettings,
};
