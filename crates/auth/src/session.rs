//! Single-session lifecycle: creation, periodic expiry checks, termination,
//! and recovery from the store.

use chrono::Duration as ChronoDuration;
use gate_core::clock::SharedClock;
use gate_core::{InterviewCode, Session};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use supabase_store::{SessionPatch, SessionRow, SharedStore};

/// Default session lifetime (1 hour).
pub const DEFAULT_SESSION_TIMEOUT_MS: i64 = 60 * 60 * 1000;

/// Default period of the validity check (5 minutes).
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// How long a terminated session stays readable before the slot is cleared.
const CLEAR_DELAY: Duration = Duration::from_millis(1000);

/// Session timing configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub timeout: ChronoDuration,
    pub check_interval: Duration,
}

impl SessionConfig {
    pub fn from_millis(timeout_ms: i64, check_interval_ms: u64) -> Self {
        Self {
            timeout: ChronoDuration::milliseconds(timeout_ms),
            check_interval: Duration::from_millis(check_interval_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_millis(DEFAULT_SESSION_TIMEOUT_MS, DEFAULT_CHECK_INTERVAL_MS)
    }
}

/// Owns the single current session and its periodic validity check.
///
/// Persistence is best-effort: inserts and termination updates run as
/// background tasks whose failures are logged, never surfaced to the
/// caller. Updates are keyed by session id so racing writes stay
/// last-write-wins.
pub struct SessionManager {
    store: SharedStore,
    clock: SharedClock,
    config: SessionConfig,
    current: Mutex<Option<Session>>,
    check_task: Mutex<Option<JoinHandle<()>>>,
    // Handed to spawned tasks so a dropped manager stops its timers instead
    // of them firing against a freed slot.
    weak: Weak<SessionManager>,
}

impl SessionManager {
    pub fn new(store: SharedStore, clock: SharedClock, config: SessionConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            store,
            clock,
            config,
            current: Mutex::new(None),
            check_task: Mutex::new(None),
            weak: weak.clone(),
        })
    }

    /// Creates a session for a validated code and installs it as the
    /// current one, superseding any prior session without terminating it.
    ///
    /// Restarts the periodic validity check and spawns a fire-and-forget
    /// insert to the store.
    pub fn create_session(&self, code: &InterviewCode) -> Session {
        let session = Session::new(code, self.clock.now(), self.config.timeout);
        *self.current.lock() = Some(session.clone());

        self.restart_check_task();
        self.spawn_insert(session.clone());

        info!(session_id = %session.id, expires_at = %session.expires_at, "Session created");
        session
    }

    /// Whether the current session is still valid.
    ///
    /// An expired session is terminated as a side effect.
    pub fn check_validity(&self) -> bool {
        let now = self.clock.now();
        let expired = {
            let current = self.current.lock();
            match current.as_ref() {
                None => return false,
                Some(session) => session.is_expired(now),
            }
        };

        if expired {
            self.terminate("Session expired");
            return false;
        }

        self.current.lock().as_ref().is_some_and(|s| s.valid)
    }

    /// Terminates the current session. Returns false when there is none.
    ///
    /// The terminated session stays readable for about a second so
    /// in-flight readers observe the terminated state once; the delayed
    /// clear is id-guarded and leaves any newer session alone.
    pub fn terminate(&self, reason: &str) -> bool {
        let now = self.clock.now();
        let terminated = {
            let mut current = self.current.lock();
            let Some(session) = current.as_mut() else {
                return false;
            };
            session.valid = false;
            session.terminated_at = Some(now);
            session.termination_reason = Some(reason.to_string());
            session.clone()
        };

        self.cancel_check_task();
        self.spawn_update(&terminated);
        self.spawn_delayed_clear(terminated.id.clone());

        info!(session_id = %terminated.id, reason, "Session terminated");
        true
    }

    /// Adopts the most recent still-valid persisted session, if any.
    ///
    /// On a miss or store error returns None without side effects.
    pub async fn recover(&self) -> Option<Session> {
        let row = match self.store.recover_session(self.clock.now()).await {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Session recovery query failed");
                return None;
            }
        };

        let session = row.into_session();
        *self.current.lock() = Some(session.clone());
        self.restart_check_task();

        info!(session_id = %session.id, "Session recovered");
        Some(session)
    }

    /// Snapshot of the current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    fn restart_check_task(&self) {
        let mut slot = self.check_task.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let weak = self.weak.clone();
        let period = self.config.check_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; skip it so checks start
            // one full interval after creation.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(manager) = weak.upgrade() else { break };
                manager.check_validity();
            }
        }));
    }

    // take() guards against double cancellation.
    fn cancel_check_task(&self) {
        if let Some(handle) = self.check_task.lock().take() {
            handle.abort();
        }
    }

    fn spawn_insert(&self, session: Session) {
        let store = self.store.clone();
        tokio::spawn(async move {
            let row = SessionRow::from(&session);
            if let Err(e) = store.insert_session(&row).await {
                error!(session_id = %session.id, error = %e, "Failed to persist session");
            }
        });
    }

    fn spawn_update(&self, session: &Session) {
        let store = self.store.clone();
        let session_id = session.id.clone();
        let patch = SessionPatch {
            valid: session.valid,
            terminated_at: session.terminated_at,
            termination_reason: session.termination_reason.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = store.update_session(&session_id, &patch).await {
                error!(session_id = %session_id, error = %e, "Failed to update persisted session");
            }
        });
    }

    fn spawn_delayed_clear(&self, session_id: String) {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            tokio::time::sleep(CLEAR_DELAY).await;
            if let Some(manager) = weak.upgrade() {
                let mut current = manager.current.lock();
                if current.as_ref().is_some_and(|s| s.id == session_id) {
                    *current = None;
                }
            }
        });
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.check_task.lock().take() {
            handle.abort();
        }
    }
}
