//! REST API client module for the artfolio service.
//!
//! This module provides the `ApiClient` for communicating with the
//! artfolio API: credential management, token verification, and the
//! artwork endpoints behind the gallery and detail screens.
//!
//! The service authenticates by opaque token; the verify endpoint takes
//! the token in the request path rather than a header.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthOutcome, DetailOutcome};
pub use error::ApiError;
