//! Unified error handling system
//!
//! Every failure a session operation can produce maps onto one of four kinds:
//! storage, network, application (server said no) and precondition (required
//! session field missing). None of them are fatal to the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type AgroResult<T> = Result<T, AgroError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the agrolens client
#[derive(Error, Debug)]
pub enum AgroError {
    /// Persisted session fields could not be read, written or removed
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// Request could not be sent or its response could not be parsed
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// Server answered but signaled failure
    #[error("Application error: {message}")]
    Application {
        message: String,
        context: ErrorContext,
    },

    /// Operation invoked without the session fields it needs
    #[error("Precondition failed: {message}")]
    Precondition {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Navigation error: {message}")]
    Navigation {
        message: String,
        route: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl AgroError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            AgroError::Storage { context, .. } => Some(context),
            AgroError::Network { context, .. } => Some(context),
            AgroError::Application { context, .. } => Some(context),
            AgroError::Precondition { context, .. } => Some(context),
            AgroError::Config { context, .. } => Some(context),
            AgroError::Navigation { context, .. } => Some(context),
            AgroError::Internal { context, .. } => Some(context),
            AgroError::Io(_) => None,
        }
    }

    /// Text shown to the user at the point of the failing action
    pub fn user_message(&self) -> String {
        match self {
            AgroError::Storage { message, .. }
            | AgroError::Network { message, .. }
            | AgroError::Application { message, .. }
            | AgroError::Precondition { message, .. }
            | AgroError::Config { message, .. }
            | AgroError::Navigation { message, .. }
            | AgroError::Internal { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether re-invoking the action may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgroError::Storage { .. }
                | AgroError::Network { .. }
                | AgroError::Application { .. }
                | AgroError::Io(_)
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        if self.is_recoverable() {
            warn!(error_id = ?error_id, error = %self, "Recoverable error");
        } else {
            error!(error_id = ?error_id, error = %self, "Error occurred");
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::AgroError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::AgroError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the session file location is writable"),
        }
    };
}

#[macro_export]
macro_rules! precondition_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::AgroError::Precondition {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::AgroError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'agrolens config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! navigation_error {
    ($msg:expr, $route:expr, $component:expr) => {
        $crate::AgroError::Navigation {
            message: $msg.to_string(),
            route: Some($route.to_string()),
            context: $crate::ErrorContext::new($component),
        }
    };
}
