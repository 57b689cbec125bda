//! Supabase REST (PostgREST) client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gate_core::InterviewCode;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;

use crate::config::SupabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::rows::{SessionPatch, SessionRow};
use crate::store::Store;

const CODES_TABLE: &str = "interview_codes";
const SESSIONS_TABLE: &str = "sessions";

/// Client for the two PostgREST tables this system reads and writes.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    /// Creates a new client with the project's anon key on every request.
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.key)
            .map_err(|e| StoreError::Request(format!("invalid API key header: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|e| StoreError::Request(format!("invalid API key header: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        info!(url = %config.url, "Created Supabase client");

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    async fn read_rows<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn ensure_success(response: reqwest::Response) -> StoreResult<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SupabaseClient {
    async fn check_connection(&self) -> StoreResult<()> {
        let response = self
            .http
            .get(self.endpoint(CODES_TABLE))
            .query(&[("select", "code"), ("limit", "1")])
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    async fn find_active_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<InterviewCode>> {
        let response = self
            .http
            .get(self.endpoint(CODES_TABLE))
            .query(&[
                ("select", "*".to_string()),
                ("code", format!("eq.{code}")),
                ("active", "eq.true".to_string()),
                ("expiration", format!("gte.{}", now.to_rfc3339())),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<InterviewCode> = Self::read_rows(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_session(&self, row: &SessionRow) -> StoreResult<()> {
        let response = self
            .http
            .post(self.endpoint(SESSIONS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    async fn update_session(&self, session_id: &str, patch: &SessionPatch) -> StoreResult<()> {
        let response = self
            .http
            .patch(self.endpoint(SESSIONS_TABLE))
            .query(&[("session_id", format!("eq.{session_id}"))])
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    async fn recover_session(&self, now: DateTime<Utc>) -> StoreResult<Option<SessionRow>> {
        let response = self
            .http
            .get(self.endpoint(SESSIONS_TABLE))
            .query(&[
                ("select", "*".to_string()),
                ("valid", "eq.true".to_string()),
                ("expires_at", format!("gt.{}", now.to_rfc3339())),
                ("order", "start_time.desc".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<SessionRow> = Self::read_rows(response).await?;
        Ok(rows.into_iter().next())
    }
}
