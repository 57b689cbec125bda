//! Core types, errors, and events for the codegate access layer.

pub mod clock;
pub mod code;
pub mod error;
pub mod events;
pub mod session;
pub mod state;

pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use code::{InterviewCode, ValidationOutcome};
pub use error::{Error, Result};
pub use events::{AuthEvent, AuthEventKind, EventBus, ListenerId};
pub use session::Session;
pub use state::{AuthState, AuthStateSnapshot};
