//! Session store: in-memory wizard state per configurator session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::wizard::Wizard;

/// Idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    wizard: Wizard,
    touched: Instant,
}

/// In-memory map of session id → wizard. Nothing is persisted; sessions
/// vanish with the process or after `ttl` without a mutation.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.duration_since(entry.touched) > self.ttl
    }

    /// Start a fresh session on the customer step. Idle sessions are
    /// swept first.
    pub async fn create(&self) -> (Uuid, Wizard) {
        let id = Uuid::new_v4();
        let wizard = Wizard::new();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let expired = self.sweep(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                wizard: wizard.clone(),
                touched: now,
            },
        );
        info!(session_id = %id, expired, "Configurator session created");
        (id, wizard)
    }

    /// Snapshot of a live session's wizard.
    pub async fn get(&self, id: Uuid) -> Option<Wizard> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id)?;
        if self.is_expired(entry, Instant::now()) {
            return None;
        }
        Some(entry.wizard.clone())
    }

    /// Apply a synchronous mutation to a session and return its result plus
    /// the resulting state. `None` if the session does not exist or expired.
    ///
    /// The lock is held only for the duration of `f`.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Wizard) -> T,
    ) -> Option<(T, Wizard)> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        if self.is_expired(entry, now) {
            sessions.remove(&id);
            debug!(session_id = %id, "Session expired");
            return None;
        }
        let result = f(&mut entry.wizard);
        entry.touched = now;
        debug!(session_id = %id, step = %entry.wizard.step, "Session updated");
        Some((result, entry.wizard.clone()))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Configurator session removed");
        }
        removed
    }

    /// Drop every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.sweep(&mut sessions, Instant::now())
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        let expired = before - sessions.len();
        if expired > 0 {
            debug!(expired, remaining = sessions.len(), "Expired sessions swept");
        }
        expired
    }

    /// Purge expired sessions every `period` until the runtime shuts down.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let expired = store.purge_expired().await;
                if expired > 0 {
                    info!(expired, "Idle configurator sessions dropped");
                }
            }
        })
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
