//! Agrolens Session - Session lifecycle for the agrolens client
//!
//! - [`store`]: persisted credential (`authToken`, `use_id`)
//! - [`gateway`]: the two backend calls that need the credential
//! - [`controller`]: hydration and logout over an owned [`Session`](agrolens_core::Session)
//! - [`boot`]: the one-shot splash-to-login transition

pub mod boot;
pub mod controller;
pub mod gateway;
pub mod store;

pub use boot::{BootOutcome, BootSequencer, SplashFade, SplashGuard};
pub use controller::SessionController;
pub use gateway::HttpSessionGateway;
pub use store::{FileSessionStore, MemorySessionStore, AUTH_TOKEN_KEY, USER_ID_KEY};
