//! codegate — interview access-code gate.
//!
//! Thin client around a hosted Supabase backend: validates an interview
//! access code, holds a single expiring session, rate limits validation
//! attempts, and announces lifecycle transitions on a typed event bus.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use auth::{AuthService, SessionConfig};
use gate_core::{AuthEvent, AuthEventKind};
use keystore::Keystore;
use supabase_store::{SupabaseClient, SupabaseConfig};
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    supabase: SupabaseConfig,

    /// Session lifetime in milliseconds
    #[serde(default = "default_session_timeout_ms")]
    session_timeout_ms: i64,

    /// Period of the session validity check in milliseconds
    #[serde(default = "default_session_check_interval_ms")]
    session_check_interval_ms: u64,

    /// Path of the local obfuscated key-value file
    #[serde(default = "default_keystore_path")]
    keystore_path: String,
}

fn default_session_timeout_ms() -> i64 {
    auth::session::DEFAULT_SESSION_TIMEOUT_MS
}

fn default_session_check_interval_ms() -> u64 {
    auth::session::DEFAULT_CHECK_INTERVAL_MS
}

fn default_keystore_path() -> String {
    ".codegate/keystore.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase: SupabaseConfig::default(),
            session_timeout_ms: default_session_timeout_ms(),
            session_check_interval_ms: default_session_check_interval_ms(),
            keystore_path: default_keystore_path(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting codegate v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    let store = Arc::new(
        SupabaseClient::new(config.supabase.clone()).context("Failed to create Supabase client")?,
    );

    let service = AuthService::new(
        store,
        SessionConfig::from_millis(config.session_timeout_ms, config.session_check_interval_ms),
    );

    let store_keys =
        Arc::new(Keystore::open(&config.keystore_path).context("Failed to open keystore")?);
    subscribe_lifecycle_logging(&service, store_keys);

    if !service.initialize().await {
        let state = service.auth_state();
        error!(
            error = state.error.as_deref().unwrap_or("unknown"),
            "Initialization failed; authentication will retry on demand"
        );
    }

    // An access code on the command line authenticates immediately.
    if let Some(code) = std::env::args().nth(1) {
        let result = service.authenticate(&code).await;
        match result.session {
            Some(session) => {
                info!(session_id = %session.id, expires_at = %session.expires_at, "Authenticated")
            }
            None => error!(
                error = result.error.as_deref().unwrap_or("unknown"),
                "Authentication failed"
            ),
        }
    }

    shutdown_signal().await;

    info!("Shutting down...");
    if service.logout("Application closed") {
        // Give the best-effort termination write a moment to reach the store.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Wires tracing output and local bookkeeping to the lifecycle events.
fn subscribe_lifecycle_logging(service: &Arc<AuthService>, store_keys: Arc<Keystore>) {
    let events = service.events();

    events.subscribe(AuthEventKind::Authenticated, move |event| {
        if let AuthEvent::Authenticated { session, recovered } = event {
            info!(session_id = %session.id, recovered = *recovered, "Session authenticated");
            if let Err(e) = store_keys.set_item("last_session", &session.id) {
                error!(error = %e, "Failed to record last session");
            }
        }
    });

    events.subscribe(AuthEventKind::AuthError, |event| {
        if let AuthEvent::AuthError { message } = event {
            warn!(message = %message, "Authentication error");
        }
    });

    events.subscribe(AuthEventKind::InitError, |event| {
        if let AuthEvent::InitError { message } = event {
            error!(message = %message, "Initialization error");
        }
    });

    events.subscribe(AuthEventKind::Logout, |event| {
        if let AuthEvent::Logout { reason } = event {
            info!(reason = %reason, "Logged out");
        }
    });
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("CODEGATE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat environment names kept from the original deployment surface.
    if let Ok(url) = std::env::var("SUPABASE_URL") {
        config.supabase.url = url;
    }
    if let Ok(key) = std::env::var("SUPABASE_KEY") {
        config.supabase.key = key;
    }
    if let Ok(timeout) = std::env::var("SESSION_TIMEOUT") {
        config.session_timeout_ms = timeout
            .parse()
            .context("SESSION_TIMEOUT must be milliseconds")?;
    }
    if let Ok(interval) = std::env::var("SESSION_CHECK_INTERVAL") {
        config.session_check_interval_ms = interval
            .parse()
            .context("SESSION_CHECK_INTERVAL must be milliseconds")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
