//! Core trait definitions
//!
//! Capabilities are injected, never ambient: the controller receives a store,
//! a gateway, a navigator and a notifier, each of which can be replaced by an
//! in-memory fake.

use crate::error::AgroResult;
use crate::types::*;
use async_trait::async_trait;
use tokio::sync::watch;

/// Persisted credential storage (`authToken` and `use_id`)
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read both persisted fields; absent fields come back as `None`
    async fn get(&self) -> AgroResult<StoredCredentials>;

    /// Persist both fields together
    async fn set(&self, token: &AuthToken, user_id: &UserId) -> AgroResult<()>;

    /// Remove both fields. Idempotent.
    async fn clear(&self) -> AgroResult<()>;
}

/// Backend operations that depend on the credential
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Resolve the display name behind a token (`GET /getUsername`)
    async fn resolve_display_name(&self, token: &AuthToken) -> AgroResult<String>;

    /// Terminate the server-side session (`POST /logout`).
    ///
    /// Fails with a precondition error, without touching the network, when
    /// `user_id` is absent.
    async fn terminate_session(&self, token: &AuthToken, user_id: Option<&UserId>)
        -> AgroResult<()>;
}

/// Screen transitions over the route tree
pub trait Navigator: Send + Sync {
    /// Put a new entry on top of the owning stack (back-navigable)
    fn push(&self, route: &str) -> AgroResult<()>;

    /// Substitute the current entry (not back-navigable)
    fn replace(&self, route: &str) -> AgroResult<()>;

    /// Pop one level; returns false when there was nothing to pop
    fn go_back(&self) -> AgroResult<bool>;
}

/// Surfaces notices to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Decides whether protected routes may be entered
pub trait AccessGate: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

impl AccessGate for watch::Receiver<SessionState> {
    fn is_authenticated(&self) -> bool {
        self.borrow().is_authenticated()
    }
}

/// Gate that never opens; used before a controller is attached
pub struct DenyAll;

impl AccessGate for DenyAll {
    fn is_authenticated(&self) -> bool {
        false
    }
}
