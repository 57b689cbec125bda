//! End-to-end authentication flow against the mock store.

use chrono::Duration;
use gate_core::{AuthEvent, AuthEventKind, Clock};
use integration_tests::fixtures;
use integration_tests::setup::TestContext;
use parking_lot::Mutex;
use std::sync::Arc;

const INVALID_CODE_MESSAGE: &str = "Invalid, expired, or inactive interview code";

#[tokio::test]
async fn test_valid_code_authenticates() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    ctx.store
        .add_code(fixtures::interview_code("TEST123", true, Duration::days(1), now));

    let result = ctx.service.authenticate("TEST123").await;

    assert!(result.success);
    assert_eq!(result.error, None);
    let session = result.session.expect("session");
    assert_eq!(session.code_used, "TEST123");
    assert_eq!(session.user_id, "user-TEST123");
    assert!(session.valid);

    let state = ctx.service.auth_state();
    assert!(state.initialized);
    assert!(state.authenticated);
    assert_eq!(state.error, None);
    assert_eq!(state.session.map(|s| s.id), Some(session.id));
}

#[tokio::test]
async fn test_lifecycle_events_in_order() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    ctx.store
        .add_code(fixtures::interview_code("TEST123", true, Duration::days(1), now));
    let seen = ctx.capture_event_kinds();

    ctx.service.authenticate("TEST123").await;

    assert_eq!(
        *seen.lock(),
        vec![
            AuthEventKind::Initializing,
            AuthEventKind::Initialized,
            AuthEventKind::Validating,
            AuthEventKind::CreatingSession,
            AuthEventKind::Authenticated,
        ]
    );
}

#[tokio::test]
async fn test_expired_inactive_and_absent_share_one_message() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    ctx.store
        .add_code(fixtures::interview_code("EXPIRED", true, Duration::days(-1), now));
    ctx.store
        .add_code(fixtures::interview_code("INACTIVE", false, Duration::days(1), now));

    for code in ["EXPIRED", "INACTIVE", "NEVER_EXISTED"] {
        let result = ctx.service.authenticate(code).await;
        assert!(!result.success, "{code} must not authenticate");
        assert!(result.session.is_none());
        assert_eq!(result.error.as_deref(), Some(INVALID_CODE_MESSAGE));
    }

    assert!(!ctx.service.auth_state().authenticated);
}

#[tokio::test]
async fn test_store_error_message_passes_through() {
    let ctx = TestContext::new();
    ctx.service.initialize().await;
    ctx.store.set_fail_queries(Some("db down"));

    let result = ctx.service.authenticate("TEST123").await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("request failed: db down"));
}

#[tokio::test]
async fn test_failed_validation_emits_auth_error() {
    let ctx = TestContext::new();
    let messages = Arc::new(Mutex::new(Vec::new()));

    let sink = messages.clone();
    ctx.service
        .events()
        .subscribe(AuthEventKind::AuthError, move |event| {
            if let AuthEvent::AuthError { message } = event {
                sink.lock().push(message.clone());
            }
        });

    ctx.service.authenticate("NOPE").await;

    assert_eq!(*messages.lock(), vec![INVALID_CODE_MESSAGE.to_string()]);
    assert_eq!(
        ctx.service.auth_state().error.as_deref(),
        Some(INVALID_CODE_MESSAGE)
    );
}

#[tokio::test]
async fn test_init_failure_is_sticky_until_retry_succeeds() {
    let ctx = TestContext::new();
    ctx.store.set_fail_connection(true);

    assert!(!ctx.service.initialize().await);

    let result = ctx.service.authenticate("TEST123").await;
    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to connect to authentication service")
    );

    // A later initialize may succeed and unblock authentication.
    ctx.store.set_fail_connection(false);
    let now = ctx.clock.now();
    ctx.store
        .add_code(fixtures::interview_code("TEST123", true, Duration::days(1), now));

    assert!(ctx.service.initialize().await);
    let result = ctx.service.authenticate("TEST123").await;
    assert!(result.success);
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let ctx = TestContext::new();
    let seen = ctx.capture_event_kinds();

    assert!(ctx.service.initialize().await);
    assert!(ctx.service.initialize().await);

    let kinds = seen.lock();
    let initializing = kinds
        .iter()
        .filter(|k| **k == AuthEventKind::Initializing)
        .count();
    assert_eq!(initializing, 1);
}

#[tokio::test]
async fn test_initialize_recovers_persisted_session() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    ctx.store.add_session(fixtures::session_row(
        "session_prev",
        Duration::minutes(10),
        Duration::minutes(50),
        now,
    ));

    let recovered = Arc::new(Mutex::new(None));
    let sink = recovered.clone();
    ctx.service
        .events()
        .subscribe(AuthEventKind::Authenticated, move |event| {
            if let AuthEvent::Authenticated { session, recovered } = event {
                *sink.lock() = Some((session.id.clone(), *recovered));
            }
        });

    assert!(ctx.service.initialize().await);

    let state = ctx.service.auth_state();
    assert!(state.authenticated);
    assert_eq!(state.session.map(|s| s.id), Some("session_prev".to_string()));
    assert_eq!(
        *recovered.lock(),
        Some(("session_prev".to_string(), true))
    );
}

#[tokio::test]
async fn test_recovery_miss_leaves_state_untouched() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    // Only an already-expired session is persisted.
    let mut row = fixtures::session_row(
        "session_old",
        Duration::hours(2),
        Duration::hours(-1),
        now,
    );
    row.valid = true;
    ctx.store.add_session(row);

    assert!(ctx.service.initialize().await);
    assert!(!ctx.service.auth_state().authenticated);
}

#[tokio::test]
async fn test_logout_flow() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    ctx.store
        .add_code(fixtures::interview_code("TEST123", true, Duration::days(1), now));

    // Logout before authenticating is a no-op.
    assert!(!ctx.service.logout("too early"));

    ctx.service.authenticate("TEST123").await;

    let reasons = Arc::new(Mutex::new(Vec::new()));
    let sink = reasons.clone();
    ctx.service
        .events()
        .subscribe(AuthEventKind::Logout, move |event| {
            if let AuthEvent::Logout { reason } = event {
                sink.lock().push(reason.clone());
            }
        });

    assert!(ctx.service.logout(auth::DEFAULT_LOGOUT_REASON));
    assert!(!ctx.service.auth_state().authenticated);
    assert_eq!(*reasons.lock(), vec!["User initiated logout".to_string()]);

    // Already logged out.
    assert!(!ctx.service.logout("again"));
}

#[tokio::test]
async fn test_validation_log_records_attempts_newest_first() {
    let ctx = TestContext::new();
    let now = ctx.clock.now();
    ctx.store
        .add_code(fixtures::interview_code("TEST123", true, Duration::days(1), now));

    ctx.service.authenticate("WRONG").await;
    ctx.service.authenticate("TEST123").await;

    let log = ctx.service.validation_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].code, "TEST123");
    assert!(log[0].success);
    assert_eq!(log[0].error, None);
    assert_eq!(log[0].identifier, "local");
    assert_eq!(log[1].code, "WRONG");
    assert!(!log[1].success);
    assert_eq!(log[1].error.as_deref(), Some(INVALID_CODE_MESSAGE));
}
