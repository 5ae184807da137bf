//! Authentication module for resolving and sharing the signed-in user.
//!
//! This module provides:
//! - `TokenStorage`: where the credential token lives (file, OS keychain, memory)
//! - `SessionStore`: the shared, subscribable view of the current user
//! - `SessionResolver`: exchanges the stored token for a user on every navigation
//!
//! Sessions are never persisted. Only the token is, under [`TOKEN_KEY`].

pub mod resolver;
pub mod session;
pub mod storage;

pub use resolver::{RedirectReason, Resolution, SessionResolver, Verification, Verifier};
pub use session::{SessionStore, UserSession};
pub use storage::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStorage, TOKEN_KEY};
