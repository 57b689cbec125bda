//! Auth orchestration: initialization, authentication, logout, state.

use gate_core::clock::{system_clock, SharedClock};
use gate_core::error::CONNECT_FAILED_MESSAGE;
use gate_core::{
    AuthEvent, AuthState, AuthStateSnapshot, EventBus, Session, ValidationOutcome,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

use supabase_store::SharedStore;

use crate::log::ValidationLogEntry;
use crate::session::{SessionConfig, SessionManager};
use crate::validator::{CodeValidator, DEFAULT_IDENTIFIER};

/// Reason used when `logout` is called without one.
pub const DEFAULT_LOGOUT_REASON: &str = "User initiated logout";

/// Value-shaped result of an authentication attempt.
///
/// This is the only shape the caller ever sees; store errors and rate
/// limiting arrive here as messages, never as panics.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub success: bool,
    pub session: Option<Session>,
    pub error: Option<String>,
}

impl AuthResult {
    fn ok(session: Session) -> Self {
        Self {
            success: true,
            session: Some(session),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            session: None,
            error: Some(message.into()),
        }
    }
}

/// Orchestrates validator and session manager and owns process-wide auth
/// state. All lifecycle transitions are announced on the event bus.
pub struct AuthService {
    store: SharedStore,
    validator: CodeValidator,
    sessions: Arc<SessionManager>,
    events: EventBus,
    state: Mutex<AuthState>,
}

impl AuthService {
    pub fn new(store: SharedStore, config: SessionConfig) -> Arc<Self> {
        Self::with_clock(store, config, system_clock())
    }

    pub fn with_clock(store: SharedStore, config: SessionConfig, clock: SharedClock) -> Arc<Self> {
        Arc::new(Self {
            validator: CodeValidator::new(store.clone(), clock.clone()),
            sessions: SessionManager::new(store.clone(), clock, config),
            store,
            events: EventBus::new(),
            state: Mutex::new(AuthState::default()),
        })
    }

    /// Connects to the store and attempts session recovery. Idempotent:
    /// short-circuits when already initializing or initialized, so
    /// concurrent callers observe the in-progress state instead of
    /// re-entering.
    pub async fn initialize(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.initializing || state.initialized {
                return state.initialized;
            }
            state.initializing = true;
        }
        self.events.emit(&AuthEvent::Initializing);

        if let Err(e) = self.store.check_connection().await {
            error!(error = %e, "Failed to connect to store");
            {
                let mut state = self.state.lock();
                state.error = Some(CONNECT_FAILED_MESSAGE.to_string());
                state.initialized = false;
                state.initializing = false;
            }
            self.events.emit(&AuthEvent::InitError {
                message: CONNECT_FAILED_MESSAGE.to_string(),
            });
            return false;
        }

        if let Some(session) = self.sessions.recover().await {
            self.state.lock().authenticated = true;
            self.events.emit(&AuthEvent::Authenticated {
                session,
                recovered: true,
            });
        }

        {
            let mut state = self.state.lock();
            state.initialized = true;
            state.initializing = false;
        }
        self.events.emit(&AuthEvent::Initialized);
        info!("Auth service initialized");
        true
    }

    /// Authenticates with the default identifier.
    pub async fn authenticate(&self, code: &str) -> AuthResult {
        self.authenticate_as(code, DEFAULT_IDENTIFIER).await
    }

    /// Full authentication flow: ensure initialization, validate the code,
    /// create the session.
    pub async fn authenticate_as(&self, code: &str, identifier: &str) -> AuthResult {
        let initialized = self.state.lock().initialized;
        if !initialized && !self.initialize().await {
            let message = self
                .state
                .lock()
                .error
                .clone()
                .unwrap_or_else(|| "Authentication service not initialized".to_string());
            return AuthResult::err(message);
        }

        self.events.emit(&AuthEvent::Validating);
        let outcome = self.validator.validate(code, identifier).await;

        let code_data = match outcome {
            ValidationOutcome::Valid(data) => data,
            ValidationOutcome::Invalid(message) => {
                self.state.lock().error = Some(message.clone());
                self.events.emit(&AuthEvent::AuthError {
                    message: message.clone(),
                });
                return AuthResult::err(message);
            }
        };

        self.events.emit(&AuthEvent::CreatingSession);
        let session = self.sessions.create_session(&code_data);

        {
            let mut state = self.state.lock();
            state.authenticated = true;
            state.error = None;
        }
        self.events.emit(&AuthEvent::Authenticated {
            session: session.clone(),
            recovered: false,
        });

        AuthResult::ok(session)
    }

    /// Terminates the session and flips `authenticated`. No-op when not
    /// authenticated.
    pub fn logout(&self, reason: &str) -> bool {
        if !self.state.lock().authenticated {
            return false;
        }

        let terminated = self.sessions.terminate(reason);
        if terminated {
            self.state.lock().authenticated = false;
            self.events.emit(&AuthEvent::Logout {
                reason: reason.to_string(),
            });
        }
        terminated
    }

    /// Snapshot of the auth state plus the current session when
    /// authenticated.
    pub fn auth_state(&self) -> AuthStateSnapshot {
        let state = self.state.lock().clone();
        let session = if state.authenticated {
            self.sessions.current()
        } else {
            None
        };
        AuthStateSnapshot {
            initialized: state.initialized,
            authenticated: state.authenticated,
            initializing: state.initializing,
            error: state.error,
            session,
        }
    }

    /// Bus carrying the lifecycle events.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Defensive copy of the validation attempt log, newest first.
    pub fn validation_log(&self) -> Vec<ValidationLogEntry> {
        self.validator.log().snapshot()
    }

    /// The session manager behind this service.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }
}
