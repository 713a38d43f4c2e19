use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::CooldownState;

use super::request_governor::DEFAULT_COOLDOWN;

pub const ANONYMOUS_SESSION: &str = "anonymous";

/// Per-caller context carrying the cooldown timer.
#[derive(Debug)]
pub struct SessionContext {
    id: String,
    cooldown: Mutex<CooldownState>,
}

impl SessionContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cooldown: Mutex::new(CooldownState::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Runs `f` with exclusive access to the cooldown state. Never hold this
    /// across an await point.
    pub fn with_cooldown<R>(&self, f: impl FnOnce(&mut CooldownState) -> R) -> R {
        let mut guard = lock(&self.cooldown);
        f(&mut guard)
    }

    fn is_idle(&self, now: Instant, idle_after: Duration) -> bool {
        self.with_cooldown(|state| {
            state
                .last_accepted()
                .is_none_or(|at| now.duration_since(at) >= idle_after)
        })
    }
}

/// Session contexts keyed by caller id.
///
/// A session whose cooldown has run out carries nothing worth keeping, so it
/// is dropped on the next insert unless a request still holds it.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<SessionContext>>>,
    idle_after: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_after(DEFAULT_COOLDOWN)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `idle_after` should match the governor's cooldown.
    pub fn with_idle_after(idle_after: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_after,
        }
    }

    /// Returns the context for `session_id`, creating it on first use.
    /// `None` maps every caller without an id onto one shared session.
    pub fn session(&self, session_id: Option<&str>) -> Arc<SessionContext> {
        let id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(ANONYMOUS_SESSION);

        let mut sessions = lock(&self.sessions);
        if let Some(existing) = sessions.get(id) {
            return Arc::clone(existing);
        }

        self.evict_idle(&mut sessions);

        let context = Arc::new(SessionContext::new(id));
        sessions.insert(id.to_string(), Arc::clone(&context));
        context
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A context still referenced outside the map belongs to a request in
    // flight and must survive, or a concurrent caller would get a fresh timer.
    fn evict_idle(&self, sessions: &mut HashMap<String, Arc<SessionContext>>) {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, context| {
            Arc::strong_count(context) > 1 || !context.is_idle(now, self.idle_after)
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
    }
}

// State behind these locks stays consistent even if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
