//! Shared fakes for session integration tests

#![allow(dead_code)]

use agrolens_core::{
    async_trait, storage_error, AgroError, AgroResult, AuthToken, ErrorContext, Navigator,
    Notice, Notifier, SessionGateway, SessionStore, StoredCredentials, UserId,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn token(raw: &str) -> AuthToken {
    AuthToken::new(raw).unwrap()
}

pub fn user(raw: &str) -> UserId {
    UserId::new(raw).unwrap()
}

/// Navigator that records every call
#[derive(Default)]
pub struct RecordingNavigator {
    pub replaced: Mutex<Vec<String>>,
    pub pushed: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: &str) -> AgroResult<()> {
        self.pushed.lock().unwrap().push(route.to_string());
        Ok(())
    }

    fn replace(&self, route: &str) -> AgroResult<()> {
        self.replaced.lock().unwrap().push(route.to_string());
        Ok(())
    }

    fn go_back(&self) -> AgroResult<bool> {
        Ok(false)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Gateway with scripted answers that records the tokens it was handed
#[derive(Default)]
pub struct ScriptedGateway {
    names: Mutex<VecDeque<AgroResult<String>>>,
    logouts: Mutex<VecDeque<AgroResult<()>>>,
    pub seen_tokens: Mutex<Vec<String>>,
    pub resolve_calls: AtomicUsize,
    pub terminate_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(self, name: &str) -> Self {
        self.names.lock().unwrap().push_back(Ok(name.to_string()));
        self
    }

    pub fn with_name_error(self, error: AgroError) -> Self {
        self.names.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_logout(self, result: AgroResult<()>) -> Self {
        self.logouts.lock().unwrap().push_back(result);
        self
    }

    pub fn network_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst) + self.terminate_calls.load(Ordering::SeqCst)
    }
}

pub fn application_error(message: &str) -> AgroError {
    AgroError::Application {
        message: message.to_string(),
        context: ErrorContext::new("scripted_gateway"),
    }
}

pub fn network_error(message: &str) -> AgroError {
    AgroError::Network {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("scripted_gateway"),
    }
}

#[async_trait]
impl SessionGateway for ScriptedGateway {
    async fn resolve_display_name(&self, token: &AuthToken) -> AgroResult<String> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(token.as_str().to_string());
        self.names
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(network_error("no scripted name")))
    }

    async fn terminate_session(
        &self,
        token: &AuthToken,
        user_id: Option<&UserId>,
    ) -> AgroResult<()> {
        assert!(user_id.is_some(), "controller must not call without a user id");
        self.terminate_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(token.as_str().to_string());
        self.logouts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(network_error("no scripted logout")))
    }
}

/// Store whose operations can be made to fail, at any point
#[derive(Default)]
pub struct FlakyStore {
    pub fields: Mutex<StoredCredentials>,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_clear: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyStore {
    pub fn holding(credentials: StoredCredentials) -> Self {
        Self {
            fields: Mutex::new(credentials),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> StoredCredentials {
        self.fields.lock().unwrap().clone()
    }

    pub fn failing_get(self, fail: bool) -> Self {
        self.fail_get.store(fail, Ordering::SeqCst);
        self
    }

    pub fn failing_set(self, fail: bool) -> Self {
        self.fail_set.store(fail, Ordering::SeqCst);
        self
    }

    pub fn failing_clear(self, fail: bool) -> Self {
        self.fail_clear.store(fail, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn get(&self) -> AgroResult<StoredCredentials> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(storage_error!("Storage unavailable", "flaky_store"));
        }
        Ok(self.snapshot())
    }

    async fn set(&self, token: &AuthToken, user_id: &UserId) -> AgroResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(storage_error!("Storage unavailable", "flaky_store"));
        }
        *self.fields.lock().unwrap() = StoredCredentials::new(token.clone(), user_id.clone());
        Ok(())
    }

    async fn clear(&self) -> AgroResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(storage_error!("Storage unavailable", "flaky_store"));
        }
        *self.fields.lock().unwrap() = StoredCredentials::default();
        Ok(())
    }
}
