//! Session Controller
//!
//! Owns the [`Session`] and drives it through
//! `Unhydrated -> Hydrating -> Authenticated | Anonymous`. Every method takes
//! `&mut self`, so at most one gateway call per session is ever in flight.
//!
//! Local state is only cleared after the server confirms the logout.

use agrolens_core::{
    log_operation_start, log_operation_success, precondition_error, AgroError, AgroResult, AuthToken, Navigator, Notice, Notifier, Session, SessionGateway,
    SessionState, SessionStore, UserId,
};
use agrolens_navigation::routes;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct SessionController {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn SessionGateway>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    session: Session,
    state: watch::Sender<SessionState>,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateway: Arc<dyn SessionGateway>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unhydrated);
        Self {
            store,
            gateway,
            navigator,
            notifier,
            session: Session::anonymous(),
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Receiver that follows every state change; usable as an access gate
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "Session state changed");
        }
    }

    fn report(&self, error: &AgroError) {
        error.log();
        self.notifier.notify(Notice::error(error.user_message()));
    }

    /// Load the persisted credential and resolve its display name.
    ///
    /// A failed resolve leaves the stored token in place so the next launch
    /// tries again; only the in-memory session drops to anonymous.
    pub async fn hydrate(&mut self) -> AgroResult<SessionState> {
        log_operation_start!("hydrate");

        let credentials = match self.store.get().await {
            Ok(credentials) => credentials,
            Err(e) => {
                // Nothing was read, so nothing changes beyond leaving Unhydrated
                if self.state() == SessionState::Unhydrated {
                    self.transition(SessionState::Anonymous);
                }
                self.report(&e);
                return Err(e);
            }
        };

        self.session = Session::from_credentials(credentials);
        let Some(token) = self.session.token().cloned() else {
            self.session.clear();
            self.transition(SessionState::Anonymous);
            log_operation_success!("hydrate", state = %SessionState::Anonymous);
            return Ok(SessionState::Anonymous);
        };

        self.transition(SessionState::Hydrating);
        match self.gateway.resolve_display_name(&token).await {
            Ok(name) => {
                self.session.set_display_name(name);
                self.transition(SessionState::Authenticated);
                log_operation_success!("hydrate", state = %SessionState::Authenticated);
                Ok(SessionState::Authenticated)
            }
            Err(e) => {
                self.session.clear();
                self.transition(SessionState::Anonymous);
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Persist a freshly issued credential (both fields in one write) and
    /// hydrate from it
    pub async fn adopt(&mut self, token: AuthToken, user_id: UserId) -> AgroResult<SessionState> {
        if let Err(e) = self.store.set(&token, &user_id).await {
            self.report(&e);
            return Err(e);
        }
        info!(user_id = %user_id, "Adopted session credentials");
        self.hydrate().await
    }

    /// End the session on the server, then locally, then return to Login.
    ///
    /// Any failure before the server confirms leaves the session untouched
    /// and `Authenticated`.
    pub async fn logout(&mut self) -> AgroResult<()> {
        log_operation_start!("logout");

        if !self.state().is_authenticated() {
            let e = precondition_error!(
                "No authenticated session to log out.",
                "authToken",
                "session_controller"
            );
            self.report(&e);
            return Err(e);
        }

        let (Some(token), Some(user_id)) = (
            self.session.token().cloned(),
            self.session.user_id().cloned(),
        ) else {
            let e = precondition_error!(
                "User ID is not available.",
                "use_id",
                "session_controller"
            );
            self.report(&e);
            return Err(e);
        };

        if let Err(e) = self.gateway.terminate_session(&token, Some(&user_id)).await {
            self.report(&e);
            return Err(e);
        }

        // Server side is gone; local state follows even if clearing storage fails
        let cleared = self.store.clear().await;
        self.session.clear();
        self.transition(SessionState::Anonymous);

        if let Err(e) = &cleared {
            self.report(e);
        }

        if let Err(e) = self.navigator.replace(routes::LOGIN) {
            self.report(&e);
            return Err(e);
        }

        self.notifier
            .notify(Notice::info("Logged Out", "You have been logged out."));
        log_operation_success!("logout");
        cleared
    }
}
