//! The seam between the auth layer and the external store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gate_core::InterviewCode;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::rows::{SessionPatch, SessionRow};

/// Typed operations the auth layer needs from the external store.
///
/// These are the only four REST shapes the system depends on: select on
/// `interview_codes`, select/insert/update on `sessions`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe used during initialization.
    async fn check_connection(&self) -> StoreResult<()>;

    /// Single-row lookup for a code that is active and unexpired at `now`.
    ///
    /// Returns `Ok(None)` whether the code never existed, expired, or is
    /// inactive; the caller collapses all three into one message.
    async fn find_active_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<InterviewCode>>;

    /// Inserts a freshly created session.
    async fn insert_session(&self, row: &SessionRow) -> StoreResult<()>;

    /// Applies a termination patch to the row with the given session id.
    async fn update_session(&self, session_id: &str, patch: &SessionPatch) -> StoreResult<()>;

    /// Most recent still-valid session, if any: `valid AND expires_at > now`,
    /// ordered by start time descending, limit 1.
    async fn recover_session(&self, now: DateTime<Utc>) -> StoreResult<Option<SessionRow>>;
}

/// Shared store handle.
pub type SharedStore = Arc<dyn Store>;
