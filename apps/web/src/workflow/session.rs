//! In-memory session registry. Each browser session owns exactly one
//! [`WorkflowController`]; controllers are never shared between sessions.
//!
//! Every lookup refreshes a session's last-seen time. Sessions idle for longer
//! than the configured timeout are dropped whenever a new one is registered.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::WorkflowController;

const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 60;

struct Session {
    controller: Arc<WorkflowController>,
    last_seen: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<WorkflowController>> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_seen = Utc::now();
            entry.controller.clone()
        })
    }

    /// Registers a controller under a fresh id, evicting idle sessions first.
    pub fn insert(&self, controller: WorkflowController) -> (Uuid, Arc<WorkflowController>) {
        let now = Utc::now();
        self.prune_idle(now);

        let id = Uuid::new_v4();
        let controller = Arc::new(controller);
        self.sessions.insert(
            id,
            Session {
                controller: controller.clone(),
                last_seen: now,
            },
        );
        debug!(session = %id, sessions = self.sessions.len(), "Session started");
        (id, controller)
    }

    /// Drops sessions not seen since `now - idle_timeout`. Returns how many
    /// were removed.
    pub fn prune_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_seen >= cutoff);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!(evicted, "Idle sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
