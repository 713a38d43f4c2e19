use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use crate::application::ports::SamplingConfig;
use crate::application::services::GovernorPolicy;
use crate::infrastructure::llm::DEFAULT_BASE_URL;
use crate::infrastructure::observability::TracingConfig;

use super::Environment;

/// Name of the variable the provider credential is read from.
pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub analysis: AnalysisSettings,
    pub knowledge_base: KnowledgeBaseSettings,
    pub governor: GovernorSettings,
    pub staging: StagingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Sampling parameters for recommendation requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: u32,
}

impl AnalysisSettings {
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: Some(self.temperature),
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: Some(self.max_output_tokens),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseSettings {
    pub documents_dir: PathBuf,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GovernorSettings {
    pub cooldown_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
}

impl GovernorSettings {
    pub fn policy(&self) -> GovernorPolicy {
        GovernorPolicy {
            cooldown: Duration::from_secs(self.cooldown_secs),
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StagingSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl LoggingSettings {
    pub fn tracing_config(&self, environment: Environment) -> TracingConfig {
        TracingConfig {
            environment: environment.to_string(),
            level: self.level.clone(),
            json_format: self.enable_json,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("API key is not configured; set {API_KEY_VAR} or llm.api_key")]
    MissingApiKey,
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}

impl Settings {
    /// Loads settings for `environment`. Sources, lowest priority first:
    /// defaults, `appsettings.<env>.*`, `APP_*` variables (`__` nests), `API_KEY`.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let builder = Config::builder()
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("llm.api_key", std::env::var(API_KEY_VAR).ok())?;

        Self::from_builder(builder)
    }

    /// Applies defaults beneath `builder`'s sources, deserializes and validates.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = with_defaults(builder)?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if self.governor.max_attempts == 0 {
            return Err(SettingsError::Invalid {
                key: "governor.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.server.max_upload_mb == 0 {
            return Err(SettingsError::Invalid {
                key: "server.max_upload_mb",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000_i64)?
        .set_default("server.max_upload_mb", 25_i64)?
        .set_default("llm.api_key", "")?
        .set_default("llm.model", "gemini-2.0-flash")?
        .set_default("llm.base_url", DEFAULT_BASE_URL)?
        .set_default("analysis.temperature", 0.0_f64)?
        .set_default("analysis.max_output_tokens", 800_i64)?
        .set_default("knowledge_base.documents_dir", "./data/")?
        .set_default("knowledge_base.output_file", "kb_summary.txt")?
        .set_default("governor.cooldown_secs", 10_i64)?
        .set_default("governor.max_attempts", 3_i64)?
        .set_default("governor.retry_delay_secs", 6_i64)?
        .set_default("staging.dir", "./staging")?
        .set_default("logging.level", "info")?
        .set_default("logging.enable_json", false)
}
