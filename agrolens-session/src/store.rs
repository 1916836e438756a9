//! Session Store implementations
//!
//! Both fields are always written together and removed together.

use agrolens_core::{
    AgroError, AgroResult, AuthToken, ErrorContext, SessionStore, StoredCredentials, UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Persisted key for the credential
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Persisted key for the user identifier
pub const USER_ID_KEY: &str = "use_id";

/// In-memory store, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemorySessionStore {
    fields: Mutex<StoredCredentials>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a credential
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            fields: Mutex::new(credentials),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> AgroResult<StoredCredentials> {
        Ok(self.fields.lock().await.clone())
    }

    async fn set(&self, token: &AuthToken, user_id: &UserId) -> AgroResult<()> {
        *self.fields.lock().await = StoredCredentials::new(token.clone(), user_id.clone());
        Ok(())
    }

    async fn clear(&self) -> AgroResult<()> {
        *self.fields.lock().await = StoredCredentials::default();
        Ok(())
    }
}

/// On-disk shape, keyed the way the mobile client persists them
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedFields {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(rename = "use_id", default, skip_serializing_if = "Option::is_none")]
    use_id: Option<String>,
}

/// JSON file store. A missing file is an anonymous session.
pub struct FileSessionStore {
    path: PathBuf,
    // Sequences store calls so a read never interleaves with a write
    io_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn failure<E>(&self, message: &str, operation: &str, source: E) -> AgroError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AgroError::Storage {
            message: message.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new("file_store")
                .with_operation(operation)
                .with_metadata("path", &self.path.display().to_string())
                .with_suggestion("Check that the session file location is writable"),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> AgroResult<StoredCredentials> {
        let _guard = self.io_lock.lock().await;

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredCredentials::default());
            }
            Err(e) => return Err(self.failure("Failed to read session", "get", e)),
        };

        let fields: PersistedFields = serde_json::from_str(&content)
            .map_err(|e| self.failure("Session file is corrupt", "get", e))?;

        Ok(StoredCredentials {
            token: fields.auth_token.and_then(AuthToken::new),
            user_id: fields.use_id.and_then(UserId::new),
        })
    }

    async fn set(&self, token: &AuthToken, user_id: &UserId) -> AgroResult<()> {
        let _guard = self.io_lock.lock().await;

        let fields = PersistedFields {
            auth_token: Some(token.as_str().to_string()),
            use_id: Some(user_id.as_str().to_string()),
        };
        let json = serde_json::to_vec_pretty(&fields)
            .map_err(|e| self.failure("Failed to encode session", "set", e))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.failure("Failed to create session directory", "set", e))?;
        }

        // Write then rename so both fields land in a single step
        let staging = self.staging_path();
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| self.failure("Failed to write session", "set", e))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                debug!(path = %staging.display(), error = %cleanup, "Staging file not removed");
            }
            return Err(self.failure("Failed to write session", "set", e));
        }

        debug!(path = %self.path.display(), "Stored session credentials");
        Ok(())
    }

    async fn clear(&self) -> AgroResult<()> {
        let _guard = self.io_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared session credentials");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.failure("Failed to clear session", "clear", e)),
        }
    }
}
