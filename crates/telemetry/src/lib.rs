//! Structured logging setup for codegate.

pub mod tracing_setup;

pub use tracing_setup::*;
