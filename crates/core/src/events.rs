//! Typed auth lifecycle events and a synchronous in-process event bus.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::session::Session;

/// Auth lifecycle events, a closed set with typed payloads.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    Initializing,
    Initialized,
    InitError { message: String },
    Validating,
    AuthError { message: String },
    CreatingSession,
    Authenticated { session: Session, recovered: bool },
    Logout { reason: String },
}

/// Discriminant used to register listeners for one event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEventKind {
    Initializing,
    Initialized,
    InitError,
    Validating,
    AuthError,
    CreatingSession,
    Authenticated,
    Logout,
}

impl AuthEvent {
    pub fn kind(&self) -> AuthEventKind {
        match self {
            Self::Initializing => AuthEventKind::Initializing,
            Self::Initialized => AuthEventKind::Initialized,
            Self::InitError { .. } => AuthEventKind::InitError,
            Self::Validating => AuthEventKind::Validating,
            Self::AuthError { .. } => AuthEventKind::AuthError,
            Self::CreatingSession => AuthEventKind::CreatingSession,
            Self::Authenticated { .. } => AuthEventKind::Authenticated,
            Self::Logout { .. } => AuthEventKind::Logout,
        }
    }
}

type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<AuthEventKind, Vec<(u64, Listener)>>,
}

/// Synchronous in-process pub/sub for auth events.
///
/// Listeners for a kind run on the emitting thread in registration order.
/// A panicking listener propagates to the emitter; there is no isolation.
/// No ordering is guaranteed across different event kinds.
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one event kind.
    pub fn subscribe<F>(&self, kind: AuthEventKind, listener: F) -> ListenerId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        ListenerId(id)
    }

    /// Removes a listener. Returns whether anything was removed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let mut removed = false;
        for list in inner.listeners.values_mut() {
            let before = list.len();
            list.retain(|(listener_id, _)| *listener_id != id.0);
            removed |= list.len() != before;
        }
        removed
    }

    /// Delivers an event to every listener registered for its kind.
    pub fn emit(&self, event: &AuthEvent) {
        // Snapshot outside the lock so listeners may subscribe reentrantly.
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock();
            match inner.listeners.get(&event.kind()) {
                Some(list) => list.iter().map(|(_, listener)| listener.clone()).collect(),
                None => return,
            }
        };

        for listener in listeners {
            listener(event);
        }
    }
}
