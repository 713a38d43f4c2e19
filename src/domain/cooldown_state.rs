use tokio::time::Instant;

/// Time of the last request accepted for one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CooldownState {
    last_accepted: Option<Instant>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    pub fn record(&mut self, at: Instant) {
        self.last_accepted = Some(at);
    }
}
