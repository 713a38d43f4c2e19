use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::LlmClientError;
use crate::domain::CooldownState;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(6);

/// Fixed limits applied to calls against the model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorPolicy {
    /// Minimum time between two accepted requests of one session.
    pub cooldown: Duration,
    /// Total attempts, first call included.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for GovernorPolicy {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    Allowed,
    Blocked { remaining_secs: u64 },
}

impl CooldownCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GovernorError {
    #[error("API quota reached. Please wait a few minutes and try again.")]
    QuotaExceeded,
    #[error(transparent)]
    Provider(LlmClientError),
}

/// Cooldown gate plus bounded retry for rate-limited provider calls.
#[derive(Debug, Clone, Default)]
pub struct RequestGovernor {
    policy: GovernorPolicy,
}

impl RequestGovernor {
    pub fn new(policy: GovernorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GovernorPolicy {
        &self.policy
    }

    /// Accepts the request and stamps `state` when the cooldown has elapsed.
    /// A blocked request leaves `state` untouched.
    pub fn check_cooldown(&self, state: &mut CooldownState) -> CooldownCheck {
        let now = Instant::now();

        if let Some(last_accepted) = state.last_accepted() {
            let elapsed = now.saturating_duration_since(last_accepted);
            if elapsed < self.policy.cooldown {
                let remaining_secs = (self.policy.cooldown - elapsed).as_secs();
                tracing::debug!(remaining_secs, "Request rejected by cooldown");
                return CooldownCheck::Blocked { remaining_secs };
            }
        }

        state.record(now);
        CooldownCheck::Allowed
    }

    /// Runs `operation`, sleeping `retry_delay` after each rate-limited attempt
    /// while attempts remain. Any other failure is returned at once.
    pub async fn call_with_retry<T, F, Fut>(&self, mut operation: F) -> Result<T, GovernorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmClientError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(LlmClientError::RateLimited) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_secs = self.policy.retry_delay.as_secs(),
                        "Model provider rate limited the request, retrying"
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
                Err(LlmClientError::RateLimited) => {
                    tracing::warn!(attempts = attempt, "Retry budget exhausted");
                    return Err(GovernorError::QuotaExceeded);
                }
                Err(e) => return Err(GovernorError::Provider(e)),
            }
        }
    }
}
