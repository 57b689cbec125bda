//! Interview code row type and validation outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row from the `interview_codes` table.
///
/// Owned by the external store and read-only to this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewCode {
    pub code: String,
    pub active: bool,
    pub expiration: DateTime<Utc>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InterviewCode {
    /// A code is usable iff it is active and not yet expired.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expiration > now
    }
}

/// Result of validating an interview code.
///
/// Either valid with the matching row, or invalid with a user-facing
/// message. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(InterviewCode),
    Invalid(String),
}

impl ValidationOutcome {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(message) => Some(message),
        }
    }
}
