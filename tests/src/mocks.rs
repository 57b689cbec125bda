//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gate_core::InterviewCode;
use parking_lot::Mutex;
use std::sync::Arc;

use supabase_store::{SessionPatch, SessionRow, Store, StoreError, StoreResult};

/// In-memory store standing in for the two Supabase tables.
///
/// Implements the same `Store` trait as the real client, so tests exercise
/// the full auth flow without a network.
#[derive(Clone, Default)]
pub struct MockStore {
    codes: Arc<Mutex<Vec<InterviewCode>>>,
    sessions: Arc<Mutex<Vec<SessionRow>>>,
    fail_connection: Arc<Mutex<bool>>,
    fail_queries: Arc<Mutex<Option<String>>>,
    code_lookups: Arc<Mutex<usize>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an `interview_codes` row.
    pub fn add_code(&self, code: InterviewCode) {
        self.codes.lock().push(code);
    }

    /// Seeds a `sessions` row.
    pub fn add_session(&self, row: SessionRow) {
        self.sessions.lock().push(row);
    }

    /// Makes `check_connection` fail.
    pub fn set_fail_connection(&self, fail: bool) {
        *self.fail_connection.lock() = fail;
    }

    /// Makes every query fail with the given message.
    pub fn set_fail_queries(&self, message: Option<&str>) {
        *self.fail_queries.lock() = message.map(str::to_string);
    }

    /// How many code lookups reached the store.
    pub fn code_lookups(&self) -> usize {
        *self.code_lookups.lock()
    }

    /// All rows currently in the `sessions` table.
    pub fn persisted_sessions(&self) -> Vec<SessionRow> {
        self.sessions.lock().clone()
    }

    /// The persisted row for a session id, if any.
    pub fn persisted_session(&self, session_id: &str) -> Option<SessionRow> {
        self.sessions
            .lock()
            .iter()
            .find(|row| row.session_id == session_id)
            .cloned()
    }

    fn query_failure(&self) -> Option<StoreError> {
        self.fail_queries
            .lock()
            .clone()
            .map(StoreError::Request)
    }
}

#[async_trait]
impl Store for MockStore {
    async fn check_connection(&self) -> StoreResult<()> {
        if *self.fail_connection.lock() {
            return Err(StoreError::Request("connection refused".to_string()));
        }
        Ok(())
    }

    async fn find_active_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<InterviewCode>> {
        *self.code_lookups.lock() += 1;
        if let Some(err) = self.query_failure() {
            return Err(err);
        }

        Ok(self
            .codes
            .lock()
            .iter()
            .find(|c| c.code == code && c.active && c.expiration >= now)
            .cloned())
    }

    async fn insert_session(&self, row: &SessionRow) -> StoreResult<()> {
        if let Some(err) = self.query_failure() {
            return Err(err);
        }
        self.sessions.lock().push(row.clone());
        Ok(())
    }

    async fn update_session(&self, session_id: &str, patch: &SessionPatch) -> StoreResult<()> {
        if let Some(err) = self.query_failure() {
            return Err(err);
        }

        let mut sessions = self.sessions.lock();
        for row in sessions.iter_mut().filter(|r| r.session_id == session_id) {
            row.valid = patch.valid;
            row.terminated_at = patch.terminated_at;
            row.termination_reason = patch.termination_reason.clone();
        }
        Ok(())
    }

    async fn recover_session(&self, now: DateTime<Utc>) -> StoreResult<Option<SessionRow>> {
        if let Some(err) = self.query_failure() {
            return Err(err);
        }

        Ok(self
            .sessions
            .lock()
            .iter()
            .filter(|row| row.valid && row.expires_at > now)
            .max_by_key(|row| row.start_time)
            .cloned())
    }
}
