//! Interview code validation with rate limiting and attempt logging.

use gate_core::clock::SharedClock;
use gate_core::error::{INVALID_CODE_MESSAGE, RATE_LIMITED_MESSAGE};
use gate_core::ValidationOutcome;
use supabase_store::SharedStore;

use crate::log::{ValidationLog, ValidationLogEntry};
use crate::rate_limit::RateLimiter;

/// Identifier used when the caller does not supply one.
pub const DEFAULT_IDENTIFIER: &str = "local";

/// Validates interview codes against the external store.
///
/// No local caching: every call re-queries the store.
pub struct CodeValidator {
    store: SharedStore,
    limiter: RateLimiter,
    log: ValidationLog,
    clock: SharedClock,
}

impl CodeValidator {
    pub fn new(store: SharedStore, clock: SharedClock) -> Self {
        Self {
            limiter: RateLimiter::new(clock.clone()),
            log: ValidationLog::new(),
            store,
            clock,
        }
    }

    /// Validates a code for the given identifier.
    ///
    /// Rate limiting rejects synchronously before any store call; every
    /// attempt counts toward the limit regardless of outcome, and every
    /// path lands in the validation log.
    pub async fn validate(&self, code: &str, identifier: &str) -> ValidationOutcome {
        if self.limiter.is_limited(identifier) {
            let outcome = ValidationOutcome::invalid(RATE_LIMITED_MESSAGE);
            self.log_outcome(code, identifier, &outcome);
            return outcome;
        }

        self.limiter.record_attempt(identifier);

        let outcome = match self.store.find_active_code(code, self.clock.now()).await {
            Ok(Some(row)) => ValidationOutcome::Valid(row),
            // Absent, expired, and inactive all collapse into one message so
            // callers cannot probe which codes exist.
            Ok(None) => ValidationOutcome::invalid(INVALID_CODE_MESSAGE),
            Err(e) => ValidationOutcome::invalid(e.to_string()),
        };

        self.log_outcome(code, identifier, &outcome);
        outcome
    }

    fn log_outcome(&self, code: &str, identifier: &str, outcome: &ValidationOutcome) {
        self.log.record(ValidationLogEntry {
            timestamp: self.clock.now(),
            code: code.to_string(),
            success: outcome.is_valid(),
            error: outcome.error().map(str::to_string),
            identifier: identifier.to_string(),
        });
    }

    /// The attempt log backing `snapshot` queries.
    pub fn log(&self) -> &ValidationLog {
        &self.log
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
