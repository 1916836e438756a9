//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential. Never empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw credential; empty strings are treated as absent
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl TryFrom<String> for AuthToken {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AuthToken::new(value).ok_or("auth token must not be empty")
    }
}

impl From<AuthToken> for String {
    fn from(token: AuthToken) -> Self {
        token.0
    }
}

/// Server-side user identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::new(value).ok_or("user id must not be empty")
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Snapshot of the persisted session fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: Option<AuthToken>,
    pub user_id: Option<UserId>,
}

impl StoredCredentials {
    pub fn new(token: AuthToken, user_id: UserId) -> Self {
        Self {
            token: Some(token),
            user_id: Some(user_id),
        }
    }

    /// Both fields absent
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user_id.is_none()
    }
}

/// The authenticated-or-not state of the client.
///
/// `display_name` can only be populated while `token` is present; a session
/// without a token is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<AuthToken>,
    user_id: Option<UserId>,
    display_name: Option<String>,
}

impl Session {
    /// Empty session, as created at process start
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_credentials(credentials: StoredCredentials) -> Self {
        Self {
            token: credentials.token,
            user_id: credentials.user_id,
            display_name: None,
        }
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    /// Record the resolved name. Returns false (and stores nothing) when no
    /// token is present.
    pub fn set_display_name(&mut self, name: impl Into<String>) -> bool {
        if self.token.is_none() {
            return false;
        }
        self.display_name = Some(name.into());
        true
    }

    /// Drop every field
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }

    /// Main menu welcome line
    pub fn greeting(&self) -> String {
        format!("Welcome, {}!", self.display_name().unwrap_or("User"))
    }
}

/// Session Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing read from storage yet
    Unhydrated,
    /// Token found, display name being resolved
    Hydrating,
    /// Token present and display name resolved
    Authenticated,
    /// No usable token; protected routes unreachable
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Unhydrated => "unhydrated",
            SessionState::Hydrating => "hydrating",
            SessionState::Authenticated => "authenticated",
            SessionState::Anonymous => "anonymous",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A message surfaced to the user (an alert in the mobile client)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notice carrying the error's user-facing message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}
