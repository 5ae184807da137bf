//! Core library for the artfolio client.
//!
//! Everything the terminal client needs that is not drawing: the REST
//! [`api::ApiClient`], wire [`models`], credential token storage, the
//! [`auth::SessionStore`] and the [`auth::SessionResolver`] that turns a
//! stored token into a signed-in user on every navigation.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod route;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{
    Resolution, RedirectReason, SessionResolver, SessionStore, TokenStorage, UserSession,
    Verification, Verifier, TOKEN_KEY,
};
pub use config::Config;
pub use route::{Navigator, Route, RouteTracker};
