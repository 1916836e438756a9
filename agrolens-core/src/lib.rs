//! Agrolens Core - Shared session types and seam definitions
//!
//! Defines the session data model, the error taxonomy and the capability traits
//! (storage, gateway, navigation, notification) that the other agrolens crates
//! implement and consume.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
