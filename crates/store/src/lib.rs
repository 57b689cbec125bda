//! Supabase access for the codegate auth layer.
//!
//! The store is an external collaborator reached through a small REST
//! surface (PostgREST filters on two tables). Everything above this crate
//! talks to the [`Store`] trait so tests can substitute an in-memory store.

pub mod client;
pub mod config;
pub mod error;
pub mod rows;
pub mod store;

pub use client::SupabaseClient;
pub use config::SupabaseConfig;
pub use error::{StoreError, StoreResult};
pub use rows::{SessionPatch, SessionRow};
pub use store::{SharedStore, Store};
