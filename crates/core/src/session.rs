//! The single authenticated session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::code::InterviewCode;

/// An authenticated session tied to a validated interview code.
///
/// At most one session is held in memory at a time; creating a new one
/// supersedes any prior in-memory reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Generated at creation, unique per session.
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub code_used: String,
    pub user_id: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
}

impl Session {
    /// Creates a fresh session for a validated code.
    pub fn new(code: &InterviewCode, now: DateTime<Utc>, timeout: Duration) -> Self {
        Self {
            id: format!("session_{}", Uuid::new_v4()),
            start_time: now,
            expires_at: now + timeout,
            code_used: code.code.clone(),
            user_id: code.user_id.clone(),
            valid: true,
            terminated_at: None,
            termination_reason: None,
        }
    }

    /// Whether the session has passed its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
