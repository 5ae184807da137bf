//! API client for communicating with the artfolio REST API.
//!
//! This module provides the `ApiClient` struct for credential management,
//! token verification and the artwork endpoints. Every endpoint answers with
//! a `{status, message, data}` envelope; `status: "error"` is surfaced as
//! [`ApiError::Rejected`] carrying the service's message.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{multipart::Form, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::auth::{Verification, Verifier};
use crate::models::{Artwork, ArtworkDetail, Envelope, ProfileData, SignInData, VerifyData};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) GET requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Token issued by sign-in or a profile update, with the service message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub token: String,
    pub message: String,
}

/// Artwork detail plus the like count the detail endpoint reports alongside it.
#[derive(Debug, Clone)]
pub struct DetailOutcome {
    pub detail: ArtworkDetail,
    pub like_count: usize,
}

#[derive(Debug, Deserialize)]
struct LikeCount {
    #[serde(default)]
    like: Option<usize>,
}

/// API client for the artfolio service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Public URL of an uploaded image file
    pub fn image_url(&self, image: &str) -> String {
        self.url(&format!("/public/images/{}", image))
    }

    // ===== Response Handling =====

    /// Parse an envelope, mapping `status: "error"` and HTTP failures to `ApiError`.
    fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Envelope<T>> {
        match serde_json::from_str::<Envelope<T>>(body) {
            Ok(envelope) if envelope.is_error() => {
                Err(ApiError::Rejected(envelope.message_or("Request failed")).into())
            }
            Ok(envelope) if status.is_success() => Ok(envelope),
            Ok(_) => Err(ApiError::from_status(status, body).into()),
            Err(e) => {
                if status.is_success() {
                    Err(ApiError::InvalidResponse(e.to_string()).into())
                } else {
                    // Error bodies that are not envelopes still carry a status worth reporting
                    match serde_json::from_str::<Envelope<serde_json::Value>>(body) {
                        Ok(envelope) if envelope.is_error() => {
                            Err(ApiError::Rejected(envelope.message_or("Request failed")).into())
                        }
                        _ => Err(ApiError::from_status(status, body).into()),
                    }
                }
            }
        }
    }

    fn require_data<T>(envelope: Envelope<T>, what: &str) -> Result<T> {
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse(format!("{} response has no data", what)).into())
    }

    async fn read(response: reqwest::Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        Ok((status, body))
    }

    /// GET an envelope, backing off on 429
    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", path))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited.into());
                }
                warn!(path, retry = retries, backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            let (status, body) = Self::read(response).await?;
            debug!(path, %status, "GET response received");
            return Self::parse_envelope(status, &body);
        }
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<Envelope<T>> {
        let response = request
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send request to {}", path))?;
        let (status, body) = Self::read(response).await?;
        debug!(path, %status, "Response received");
        Self::parse_envelope(status, &body)
    }

    // ===== Credentials =====

    /// Exchange a token for the user it belongs to. A 401 is a rejection, not an error.
    pub async fn verify_token(&self, token: &str) -> Result<Verification> {
        let url = self.url(&format!("/api/auth/verify/{}", token));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send verification request")?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Verifier rejected token");
            return Ok(Verification::Rejected);
        }

        let (status, body) = Self::read(response).await?;
        debug!(%status, "Verification response received");

        // Any other status is read for the user object; only its absence is an error.
        let envelope: Envelope<VerifyData> = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("verify: {}", e)))?;
        match envelope.data {
            Some(data) => Ok(Verification::Accepted(data.user)),
            None if !status.is_success() => Err(ApiError::from_status(status, &body).into()),
            None => Err(ApiError::InvalidResponse("verify response has no user".to_string()).into()),
        }
    }

    /// Sign in with username and password
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<AuthOutcome> {
        let path = "/api/auth/sign-in";
        let body = serde_json::json!({ "username": username, "password": password });
        let request = self.client.post(self.url(path)).json(&body);

        let envelope: Envelope<SignInData> = self.send_envelope(request, path).await?;
        let message = envelope.message_or("Signed in");
        let data = Self::require_data(envelope, "sign-in")?;
        let token = data
            .first_token()
            .ok_or_else(|| ApiError::InvalidResponse("sign-in response has no token".to_string()))?
            .to_string();

        Ok(AuthOutcome { token, message })
    }

    /// Register a new account. Returns the service message.
    pub async fn sign_up(&self, name: &str, username: &str, password: &str) -> Result<String> {
        let path = "/api/auth/sign-up";
        let form = Form::new()
            .text("name", name.to_string())
            .text("username", username.to_string())
            .text("password", password.to_string());
        let request = self.client.post(self.url(path)).multipart(form);

        let envelope: Envelope<serde_json::Value> = self.send_envelope(request, path).await?;
        Ok(envelope.message_or("Account created"))
    }

    /// Invalidate `token` on the server. Returns the service message.
    pub async fn sign_out(&self, token: &str) -> Result<String> {
        let path = "/api/auth/sign-out";
        let body = serde_json::json!({ "token": token });
        let request = self.client.post(self.url(path)).json(&body);

        let envelope: Envelope<serde_json::Value> = self.send_envelope(request, path).await?;
        Ok(envelope.message_or("Signed out"))
    }

    /// Rename the user. The service re-issues the token, which must replace the stored one.
    pub async fn update_profile(&self, user_id: &str, name: &str) -> Result<AuthOutcome> {
        let path = "/api/auth/update-profile";
        let body = serde_json::json!({ "name": name, "userId": user_id });
        let request = self.client.post(self.url(path)).json(&body);

        let envelope: Envelope<ProfileData> = self.send_envelope(request, path).await?;
        let message = envelope.message_or("Profile updated");
        let data = Self::require_data(envelope, "update-profile")?;

        Ok(AuthOutcome {
            token: data.token,
            message,
        })
    }

    // ===== Artworks =====

    /// Fetch every artwork for the gallery
    pub async fn fetch_artworks(&self) -> Result<Vec<Artwork>> {
        let envelope: Envelope<Vec<Artwork>> = self.get_envelope("/api/images").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Fetch one artwork with its comments and likes
    pub async fn fetch_artwork_detail(&self, id: i64) -> Result<DetailOutcome> {
        let path = format!("/api/images/detail/{}", id);
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to fetch artwork detail")?;

        let (status, body) = Self::read(response).await?;
        let envelope: Envelope<ArtworkDetail> = Self::parse_envelope(status, &body)?;
        let detail = Self::require_data(envelope, "detail")?;

        let like_count = serde_json::from_str::<LikeCount>(&body)
            .ok()
            .and_then(|c| c.like)
            .unwrap_or(detail.likes.len());

        Ok(DetailOutcome { detail, like_count })
    }

    /// Fetch an artwork for editing. The service refuses unless `user_id` owns it.
    pub async fn fetch_artwork_for_edit(&self, id: i64, user_id: &str) -> Result<Artwork> {
        let envelope: Envelope<Artwork> = self
            .get_envelope(&format!("/api/images/edit/{}/{}", id, user_id))
            .await?;
        Self::require_data(envelope, "edit")
    }

    /// Update title and description. Returns the updated artwork and the service message.
    pub async fn update_artwork(
        &self,
        id: i64,
        user_id: &str,
        title: &str,
        content: &str,
    ) -> Result<(Artwork, String)> {
        let path = format!("/api/images/{}", id);
        let form = Form::new()
            .text("title", title.to_string())
            .text("content", content.to_string())
            .text("userId", user_id.to_string());
        let request = self.client.patch(self.url(&path)).multipart(form);

        let envelope: Envelope<Artwork> = self.send_envelope(request, &path).await?;
        let message = envelope.message_or("Artwork updated");
        let artwork = Self::require_data(envelope, "update")?;
        Ok((artwork, message))
    }

    /// Delete an artwork owned by `user_id`. Returns the service message.
    pub async fn delete_artwork(&self, id: i64, user_id: &str) -> Result<String> {
        let path = "/api/images";
        let form = Form::new()
            .text("id", id.to_string())
            .text("userId", user_id.to_string());
        let request = self.client.delete(self.url(path)).multipart(form);

        let envelope: Envelope<serde_json::Value> = self.send_envelope(request, path).await?;
        Ok(envelope.message_or("Artwork deleted"))
    }
}

#[async_trait]
impl Verifier for ApiClient {
    async fn verify(&self, token: &str) -> Result<Verification> {
        self.verify_token(token).await
    }
}
