//! Row types for the `sessions` table.

use chrono::{DateTime, Utc};
use gate_core::Session;
use serde::{Deserialize, Serialize};

/// A row in the `sessions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub session_id: String,
    pub code: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
}

impl From<&Session> for SessionRow {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            code: session.code_used.clone(),
            user_id: session.user_id.clone(),
            start_time: session.start_time,
            expires_at: session.expires_at,
            valid: session.valid,
            terminated_at: session.terminated_at,
            termination_reason: session.termination_reason.clone(),
        }
    }
}

impl SessionRow {
    /// Reconstructs the in-memory session from a persisted row.
    pub fn into_session(self) -> Session {
        Session {
            id: self.session_id,
            start_time: self.start_time,
            expires_at: self.expires_at,
            code_used: self.code,
            user_id: self.user_id,
            valid: self.valid,
            terminated_at: self.terminated_at,
            termination_reason: self.termination_reason,
        }
    }
}

/// Fields updated when a session ends.
///
/// Updates are keyed by session id and last-write-wins, so a slow write
/// racing a later termination stays idempotent.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPatch {
    pub valid: bool,
    pub terminated_at: Option<DateTime<Utc>>,
    pub termination_reason: Option<String>,
}
