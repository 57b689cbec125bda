//! Process-wide authentication state.

use serde::Serialize;

use crate::session::Session;

/// Authentication state held by the auth service.
///
/// Transitions: uninitialized -> initializing -> initialized, or back to
/// uninitialized on an init error so a later attempt can retry.
/// `authenticated` flips independently on login, recovery, and logout.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub initialized: bool,
    pub authenticated: bool,
    pub initializing: bool,
    pub error: Option<String>,
}

/// Snapshot handed to callers: the state plus the current session when
/// authenticated.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStateSnapshot {
    pub initialized: bool,
    pub authenticated: bool,
    pub initializing: bool,
    pub error: Option<String>,
    pub session: Option<Session>,
}
