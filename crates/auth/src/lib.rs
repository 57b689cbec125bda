//! Authentication core for codegate.
//!
//! Orchestration flow: `AuthService::authenticate` -> rate limiter ->
//! code validator -> session manager, with lifecycle events emitted on the
//! typed bus along the way.

pub mod log;
pub mod rate_limit;
pub mod service;
pub mod session;
pub mod validator;

pub use log::{ValidationLog, ValidationLogEntry, MAX_LOG_ENTRIES};
pub use rate_limit::RateLimiter;
pub use service::{AuthResult, AuthService, DEFAULT_LOGOUT_REASON};
pub use session::{SessionConfig, SessionManager};
pub use validator::{CodeValidator, DEFAULT_IDENTIFIER};
