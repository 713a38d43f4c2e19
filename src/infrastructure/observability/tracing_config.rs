/// What `init_tracing` needs to know about the deployment.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    /// Base filter directive used when `RUST_LOG` is unset, e.g. `info`.
    pub level: String,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl TracingConfig {
    /// The configured level, with this crate and the HTTP layer at debug.
    pub fn default_filter(&self) -> String {
        format!("{},policy_advisor=debug,tower_http=debug", self.level)
    }
}
