//! Data models for artfolio API payloads.
//!
//! This module contains the structures exchanged with the service:
//!
//! - `Envelope`: the `{status, message, data}` wrapper every endpoint uses
//! - `VerifiedUser`, `SignInData`, `ProfileData`: credential payloads
//! - `Artwork`, `ArtworkDetail`, `Comment`, `Like`: gallery content

pub mod artwork;
pub mod envelope;
pub mod user;

pub use artwork::{Artwork, ArtworkDetail, Author, Comment, Like};
pub use envelope::Envelope;
pub use user::{ProfileData, SignInData, TokenRecord, VerifiedUser, VerifyData};
