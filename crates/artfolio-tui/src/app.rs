//! Application state management for Artfolio.
//!
//! This module contains the core `App` struct that owns all UI state, the
//! shared session store and the background task channel. Navigation goes
//! through [`App::navigate`], which runs a session resolution cycle each time
//! the route actually changes.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use artfolio_core::api::{ApiError, DetailOutcome};
use artfolio_core::models::Artwork;
use artfolio_core::{
    ApiClient, Config, Navigator, Resolution, Route, RouteTracker, SessionResolver, SessionStore,
    TokenStorage, UserSession, TOKEN_KEY,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for name and username input.
const MAX_NAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for an artwork title.
const MAX_TITLE_LENGTH: usize = 100;

/// Maximum length for an artwork description.
const MAX_CONTENT_LENGTH: usize = 1000;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    ConfirmingDelete,
    Quitting,
}

/// Which credential form the auth screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Auth form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Username,
    Password,
    Button,
}

impl AuthField {
    /// Next field in tab order. The name field only exists when signing up.
    pub fn next(self, mode: AuthMode) -> Self {
        match (self, mode) {
            (AuthField::Name, _) => AuthField::Username,
            (AuthField::Username, _) => AuthField::Password,
            (AuthField::Password, _) => AuthField::Button,
            (AuthField::Button, AuthMode::SignUp) => AuthField::Name,
            (AuthField::Button, AuthMode::SignIn) => AuthField::Username,
        }
    }

    pub fn prev(self, mode: AuthMode) -> Self {
        match (self, mode) {
            (AuthField::Name, _) => AuthField::Button,
            (AuthField::Username, AuthMode::SignUp) => AuthField::Name,
            (AuthField::Username, AuthMode::SignIn) => AuthField::Button,
            (AuthField::Password, _) => AuthField::Username,
            (AuthField::Button, _) => AuthField::Password,
        }
    }
}

/// Edit form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Content,
    Button,
}

impl EditField {
    pub fn next(self) -> Self {
        match self {
            EditField::Title => EditField::Content,
            EditField::Content => EditField::Button,
            EditField::Button => EditField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EditField::Title => EditField::Button,
            EditField::Content => EditField::Title,
            EditField::Button => EditField::Content,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from spawned tasks back to the UI loop.
#[derive(Debug)]
pub enum TaskResult {
    /// The session resolver asked to move to another route
    Redirect(Route),
    /// A resolution cycle finished
    Resolved(Route, std::result::Result<Resolution, String>),
    Artworks(Vec<Artwork>),
    Detail(i64, DetailOutcome),
    DetailFailed(i64, String),
    EditLoaded(Artwork),
    EditFailed(String),
    SignedIn(String),
    SignedUp(String),
    AuthFailed(String),
    SignedOut(String),
    ProfileUpdated(String),
    ArtworkUpdated(i64, String),
    ArtworkDeleted(String),
    /// An error to show in the status bar
    Error(String),
}

/// Forwards resolver redirects into the UI loop.
pub struct ChannelNavigator {
    tx: mpsc::Sender<TaskResult>,
}

impl ChannelNavigator {
    pub fn new(tx: mpsc::Sender<TaskResult>) -> Self {
        Self { tx }
    }
}

impl Navigator for ChannelNavigator {
    fn redirect(&self, to: Route) {
        if let Err(e) = self.tx.try_send(TaskResult::Redirect(to)) {
            warn!(error = %e, "Failed to queue redirect");
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionStore,
    resolver: SessionResolver,
    tokens: Arc<dyn TokenStorage>,
    routes: RouteTracker,
    session_rx: watch::Receiver<Option<UserSession>>,

    // UI State
    pub state: AppState,

    // Auth form state
    pub auth_mode: AuthMode,
    pub auth_name: String,
    pub auth_username: String,
    pub auth_password: String,
    pub auth_focus: AuthField,
    pub auth_error: Option<String>,
    pub auth_pending: bool,

    // Gallery
    pub artworks: Vec<Artwork>,
    pub gallery_selection: usize,
    pub gallery_loading: bool,

    // Artwork detail
    pub detail: Option<DetailOutcome>,
    pub detail_loading: bool,
    pub detail_error: Option<String>,
    pub comment_scroll: usize,

    // Edit form
    pub edit_title: String,
    pub edit_content: String,
    pub edit_focus: EditField,
    pub edit_loaded: bool,
    pub edit_error: Option<String>,

    // Profile form
    pub profile_name: String,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance from a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api_url())?;
        let tokens = config.token_storage()?;
        debug!(api_url = api.base_url(), backend = ?config.token_backend, "Services configured");
        Ok(Self::with_services(config, api, tokens))
    }

    /// Create an application around explicit services
    pub fn with_services(config: Config, api: ApiClient, tokens: Arc<dyn TokenStorage>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let session = SessionStore::new();
        let resolver = SessionResolver::new(
            Arc::new(api.clone()),
            tokens.clone(),
            Arc::new(ChannelNavigator::new(tx.clone())),
            session.clone(),
        );
        let session_rx = session.subscribe();
        let auth_username = config.last_username.clone().unwrap_or_default();

        Self {
            config,
            api,
            session,
            resolver,
            tokens,
            routes: RouteTracker::new(),
            session_rx,

            state: AppState::Normal,

            auth_mode: AuthMode::SignIn,
            auth_name: String::new(),
            auth_username,
            auth_password: String::new(),
            auth_focus: AuthField::Username,
            auth_error: None,
            auth_pending: false,

            artworks: Vec::new(),
            gallery_selection: 0,
            gallery_loading: false,

            detail: None,
            detail_loading: false,
            detail_error: None,
            comment_scroll: 0,

            edit_title: String::new(),
            edit_content: String::new(),
            edit_focus: EditField::Title,
            edit_loaded: false,
            edit_error: None,

            profile_name: String::new(),

            task_rx: rx,
            task_tx: tx,

            status_message: None,
        }
    }

    /// Current route; the gallery until the first navigation
    pub fn route(&self) -> Route {
        self.routes.current().cloned().unwrap_or(Route::Gallery)
    }

    pub fn user(&self) -> Option<UserSession> {
        self.session.get()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move to `route`. Resolves the session and loads the route's data, but
    /// only when the route differs from the current one.
    pub fn navigate(&mut self, route: Route) {
        if !self.routes.enter(route.clone()) {
            debug!(%route, "Already on route");
            return;
        }
        info!(%route, "Navigating");
        self.state = AppState::Normal;
        self.enter_route(&route);
        self.spawn_resolution(route);
    }

    /// Re-resolve the session without changing route
    pub fn refresh_session(&mut self) {
        self.spawn_resolution(self.route());
    }

    fn spawn_resolution(&self, route: Route) {
        let resolver = self.resolver.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(&route).await.map_err(|e| format!("{:#}", e));
            Self::send_result(&tx, TaskResult::Resolved(route, result)).await;
        });
    }

    /// Reset per-route state and start the route's fetches
    fn enter_route(&mut self, route: &Route) {
        match route {
            Route::Gallery => self.fetch_artworks(),
            Route::Artwork(id) => {
                self.detail = None;
                self.detail_error = None;
                self.comment_scroll = 0;
                self.fetch_detail(*id);
            }
            Route::EditArtwork(id) => {
                self.edit_title.clear();
                self.edit_content.clear();
                self.edit_focus = EditField::Title;
                self.edit_loaded = false;
                self.edit_error = None;
                // Needs the user id; deferred until the session resolves if absent
                if let Some(user) = self.user() {
                    self.fetch_edit(*id, &user.id);
                }
            }
            Route::Profile => {
                self.profile_name = self.user().map(|u| u.name).unwrap_or_default();
            }
            Route::SignIn | Route::SignUp => {
                self.auth_mode = if *route == Route::SignUp {
                    AuthMode::SignUp
                } else {
                    AuthMode::SignIn
                };
                self.reset_auth_form();
            }
        }
    }

    /// Apply a session change to screens that depend on the user
    fn on_session_changed(&mut self) {
        let user = self.user();
        debug!(signed_in = user.is_some(), "Session changed");
        match (self.route(), user) {
            (Route::EditArtwork(id), Some(user)) if !self.edit_loaded => {
                self.fetch_edit(id, &user.id);
            }
            (Route::Profile, Some(user)) if self.profile_name.is_empty() => {
                self.profile_name = user.name;
            }
            _ => {}
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    fn reset_auth_form(&mut self) {
        self.auth_password.clear();
        self.auth_error = None;
        self.auth_pending = false;
        self.auth_focus = match self.auth_mode {
            AuthMode::SignUp => AuthField::Name,
            AuthMode::SignIn if self.auth_username.is_empty() => AuthField::Username,
            AuthMode::SignIn => AuthField::Password,
        };
    }

    /// Switch between the sign-in and sign-up forms
    pub fn toggle_auth_mode(&mut self) {
        self.auth_mode = match self.auth_mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.reset_auth_form();
    }

    /// Submit the auth form in its current mode
    pub fn submit_auth(&mut self) {
        if self.auth_pending {
            return;
        }
        let missing = self.auth_username.is_empty()
            || self.auth_password.is_empty()
            || (self.auth_mode == AuthMode::SignUp && self.auth_name.is_empty());
        if missing {
            self.auth_error = Some("All fields are required".to_string());
            return;
        }

        self.auth_error = None;
        self.auth_pending = true;

        let api = self.api.clone();
        let tokens = self.tokens.clone();
        let tx = self.task_tx.clone();
        let name = self.auth_name.clone();
        let username = self.auth_username.clone();
        let password = self.auth_password.clone();
        let mode = self.auth_mode;

        tokio::spawn(async move {
            let result = match mode {
                AuthMode::SignIn => match api.sign_in(&username, &password).await {
                    Ok(outcome) => match tokens.write(TOKEN_KEY, &outcome.token) {
                        Ok(()) => TaskResult::SignedIn(outcome.message),
                        Err(e) => TaskResult::AuthFailed(format!("Could not store token: {}", e)),
                    },
                    Err(e) => TaskResult::AuthFailed(Self::describe_error(&e)),
                },
                AuthMode::SignUp => match api.sign_up(&name, &username, &password).await {
                    Ok(message) => TaskResult::SignedUp(message),
                    Err(e) => TaskResult::AuthFailed(Self::describe_error(&e)),
                },
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Sign out on the server, then forget the token locally
    pub fn sign_out(&mut self) {
        let Some(user) = self.user() else {
            self.status_message = Some("Not signed in".to_string());
            return;
        };

        let api = self.api.clone();
        let resolver = self.resolver.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match api.sign_out(&user.token).await {
                Ok(message) => {
                    if let Err(e) = resolver.sign_out() {
                        warn!(error = %e, "Failed to clear token on sign-out");
                    }
                    TaskResult::SignedOut(message)
                }
                Err(e) => TaskResult::Error(Self::describe_error(&e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Save the profile name. The service re-issues the token.
    pub fn submit_profile(&mut self) {
        let Some(user) = self.user() else {
            self.status_message = Some("Please sign in first".to_string());
            return;
        };
        if self.profile_name.is_empty() {
            self.status_message = Some("Name is required".to_string());
            return;
        }

        let api = self.api.clone();
        let tokens = self.tokens.clone();
        let tx = self.task_tx.clone();
        let name = self.profile_name.clone();

        tokio::spawn(async move {
            let result = match api.update_profile(&user.id, &name).await {
                Ok(outcome) => match tokens.write(TOKEN_KEY, &outcome.token) {
                    Ok(()) => TaskResult::ProfileUpdated(outcome.message),
                    Err(e) => TaskResult::Error(format!("Could not store token: {}", e)),
                },
                Err(e) => TaskResult::Error(Self::describe_error(&e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Artworks
    // =========================================================================

    /// Reload whatever the current route shows
    pub fn refresh_current(&mut self) {
        match self.route() {
            Route::Gallery => self.fetch_artworks(),
            Route::Artwork(id) => self.fetch_detail(id),
            _ => {}
        }
    }

    fn fetch_artworks(&mut self) {
        self.gallery_loading = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match api.fetch_artworks().await {
                Ok(artworks) => TaskResult::Artworks(artworks),
                Err(e) => TaskResult::Error(format!("Failed to load gallery: {}", Self::describe_error(&e))),
            };
            Self::send_result(&tx, result).await;
        });
    }

    fn fetch_detail(&mut self, id: i64) {
        self.detail_loading = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match api.fetch_artwork_detail(id).await {
                Ok(outcome) => TaskResult::Detail(id, outcome),
                Err(e) => TaskResult::DetailFailed(id, Self::describe_error(&e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    fn fetch_edit(&mut self, id: i64, user_id: &str) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let user_id = user_id.to_string();
        // Marked loaded up front so a session change does not start a second fetch
        self.edit_loaded = true;
        tokio::spawn(async move {
            let result = match api.fetch_artwork_for_edit(id, &user_id).await {
                Ok(artwork) => TaskResult::EditLoaded(artwork),
                Err(e) => TaskResult::EditFailed(Self::describe_error(&e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Artwork on the detail screen, if the current user owns it
    pub fn owned_detail(&self) -> Option<&Artwork> {
        let user = self.session.get()?;
        self.detail
            .as_ref()
            .map(|d| &d.detail.artwork)
            .filter(|a| a.is_owned_by(&user.id))
    }

    pub fn submit_edit(&mut self) {
        let Route::EditArtwork(id) = self.route() else {
            return;
        };
        let Some(user) = self.user() else {
            self.edit_error = Some("Please sign in first".to_string());
            return;
        };
        if self.edit_title.is_empty() {
            self.edit_error = Some("Title is required".to_string());
            return;
        }

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let title = self.edit_title.clone();
        let content = self.edit_content.clone();

        tokio::spawn(async move {
            let result = match api.update_artwork(id, &user.id, &title, &content).await {
                Ok((artwork, message)) => TaskResult::ArtworkUpdated(artwork.id, message),
                Err(e) => TaskResult::EditFailed(Self::describe_error(&e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Ask for confirmation before deleting the artwork on screen
    pub fn request_delete(&mut self) {
        if self.owned_detail().is_some() {
            self.state = AppState::ConfirmingDelete;
        } else {
            self.status_message = Some("You can only delete your own artworks".to_string());
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let (Some(artwork), Some(user)) = (self.owned_detail().cloned(), self.user()) else {
            return;
        };

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match api.delete_artwork(artwork.id, &user.id).await {
                Ok(message) => TaskResult::ArtworkDeleted(message),
                Err(e) => TaskResult::Error(Self::describe_error(&e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Background Task Processing
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - receiver dropped");
        }
    }

    /// User-facing text for an error, preferring the service's own message
    pub fn describe_error(e: &anyhow::Error) -> String {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => api_error.user_message(),
            None => format!("{:#}", e),
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }

        if self.session_rx.has_changed().unwrap_or(false) {
            drop(self.session_rx.borrow_and_update());
            self.on_session_changed();
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Redirect(route) => {
                debug!(%route, "Redirect requested");
                self.navigate(route);
            }
            TaskResult::Resolved(route, Ok(resolution)) => {
                let authenticated = matches!(resolution, Resolution::Authenticated(_));
                debug!(%route, authenticated, "Resolution finished");
                match resolution {
                    // Signed-in users have no business on the credential forms
                    Resolution::Authenticated(_) if self.route().is_auth() => {
                        self.navigate(Route::Gallery);
                    }
                    // Also covers a redirect the navigator could not queue
                    Resolution::Redirected { to, .. } => self.navigate(to),
                    _ => {}
                }
            }
            TaskResult::Resolved(route, Err(message)) => {
                error!(%route, error = %message, "Session resolution failed");
                self.status_message = Some(format!("Could not verify session: {}", message));
            }
            TaskResult::Artworks(artworks) => {
                self.gallery_loading = false;
                self.gallery_selection = self.gallery_selection.min(artworks.len().saturating_sub(1));
                self.artworks = artworks;
            }
            TaskResult::Detail(id, outcome) => {
                if self.route() == Route::Artwork(id) {
                    self.detail_loading = false;
                    self.detail = Some(outcome);
                }
            }
            TaskResult::DetailFailed(id, message) => {
                if self.route() == Route::Artwork(id) {
                    self.detail_loading = false;
                    self.detail_error = Some(message);
                }
            }
            TaskResult::EditLoaded(artwork) => {
                if self.route() == Route::EditArtwork(artwork.id) {
                    self.edit_title = artwork.title;
                    self.edit_content = artwork.content;
                    self.edit_error = None;
                }
            }
            TaskResult::EditFailed(message) => {
                self.edit_error = Some(message);
            }
            TaskResult::SignedIn(message) => {
                info!(username = %self.auth_username, "Signed in");
                self.auth_pending = false;
                self.auth_password.clear();
                self.config.last_username = Some(self.auth_username.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.status_message = Some(message);
                self.navigate(Route::Gallery);
            }
            TaskResult::SignedUp(message) => {
                self.status_message = Some(message);
                self.auth_mode = AuthMode::SignIn;
                self.reset_auth_form();
            }
            TaskResult::AuthFailed(message) => {
                warn!(error = %message, "Authentication failed");
                self.auth_pending = false;
                self.auth_password.clear();
                self.auth_error = Some(message);
            }
            TaskResult::SignedOut(message) => {
                info!("Signed out");
                self.status_message = Some(message);
                self.navigate(Route::SignIn);
            }
            TaskResult::ProfileUpdated(message) => {
                self.status_message = Some(message);
                self.refresh_session();
            }
            TaskResult::ArtworkUpdated(id, message) => {
                self.status_message = Some(message);
                self.navigate(Route::Artwork(id));
            }
            TaskResult::ArtworkDeleted(message) => {
                self.status_message = Some(message);
                self.detail = None;
                self.navigate(Route::Gallery);
            }
            TaskResult::Error(message) => {
                self.gallery_loading = false;
                self.status_message = Some(message);
            }
        }
    }

    // =========================================================================
    // Gallery Selection
    // =========================================================================

    pub fn selected_artwork(&self) -> Option<&Artwork> {
        self.artworks.get(self.gallery_selection)
    }

    pub fn move_gallery_selection(&mut self, delta: isize) {
        if self.artworks.is_empty() {
            self.gallery_selection = 0;
            return;
        }
        let max = self.artworks.len() - 1;
        let next = self.gallery_selection as isize + delta;
        self.gallery_selection = next.clamp(0, max as isize) as usize;
    }
}

// ============================================================================
// Input Validation
// ============================================================================

/// Check if a character should be accepted in a text field
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a name or username character should be accepted
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a title character should be accepted
pub fn can_add_title_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TITLE_LENGTH && is_valid_input_char(c)
}

/// Check if a description character should be accepted
pub fn can_add_content_char(current_len: usize, c: char) -> bool {
    current_len < MAX_CONTENT_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use artfolio_core::auth::MemoryTokenStore;
    use artfolio_core::config::TokenBackend;
    use artfolio_core::RedirectReason;

    fn test_app() -> App {
        // Nothing listens on port 9; requests fail fast and are not awaited here
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        App::with_services(Config::default(), api, Arc::new(MemoryTokenStore::new()))
    }

    // -------------------------------------------------------------------------
    // Focus Order Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_auth_field_cycle_sign_in() {
        let mode = AuthMode::SignIn;
        assert_eq!(AuthField::Username.next(mode), AuthField::Password);
        assert_eq!(AuthField::Password.next(mode), AuthField::Button);
        assert_eq!(AuthField::Button.next(mode), AuthField::Username); // Skips name
        assert_eq!(AuthField::Username.prev(mode), AuthField::Button);
    }

    #[test]
    fn test_auth_field_cycle_sign_up() {
        let mode = AuthMode::SignUp;
        assert_eq!(AuthField::Button.next(mode), AuthField::Name);
        assert_eq!(AuthField::Name.next(mode), AuthField::Username);
        assert_eq!(AuthField::Username.prev(mode), AuthField::Name);
        assert_eq!(AuthField::Name.prev(mode), AuthField::Button);
    }

    #[test]
    fn test_edit_field_cycle() {
        assert_eq!(EditField::Title.next(), EditField::Content);
        assert_eq!(EditField::Button.next(), EditField::Title);
        assert_eq!(EditField::Title.prev(), EditField::Button);
    }

    // -------------------------------------------------------------------------
    // Construction Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_uses_given_config() {
        let config = Config {
            api_url: Some("http://artfolio.test/".to_string()),
            last_username: Some("ada".to_string()),
            // Keyring store opens nothing until used
            token_backend: TokenBackend::Keyring,
        };

        let app = App::new(config).unwrap();

        if std::env::var("ARTFOLIO_API_URL").is_err() {
            assert_eq!(app.api.base_url(), "http://artfolio.test");
        }
        assert_eq!(app.auth_username, "ada");
        assert_eq!(app.config.last_username.as_deref(), Some("ada"));
    }

    // -------------------------------------------------------------------------
    // Navigation Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_navigate_same_route_is_noop() {
        let mut app = test_app();
        app.navigate(Route::Profile);
        app.profile_name = "edited".to_string();

        // Re-entering the same route must not reset route state
        app.navigate(Route::Profile);
        assert_eq!(app.profile_name, "edited");
        assert_eq!(app.route(), Route::Profile);
    }

    #[tokio::test]
    async fn test_navigate_to_sign_up_selects_form() {
        let mut app = test_app();
        app.navigate(Route::SignUp);
        assert_eq!(app.auth_mode, AuthMode::SignUp);
        assert_eq!(app.auth_focus, AuthField::Name);
    }

    #[tokio::test]
    async fn test_redirect_to_current_route_keeps_form() {
        let mut app = test_app();
        app.navigate(Route::SignIn);
        app.auth_username = "ada".to_string();
        app.auth_password = "secret".to_string();

        app.process_task_result(TaskResult::Redirect(Route::SignIn));

        assert_eq!(app.auth_password, "secret");
    }

    #[tokio::test]
    async fn test_submit_auth_requires_fields() {
        let mut app = test_app();
        app.navigate(Route::SignIn);
        app.auth_username.clear();
        app.submit_auth();
        assert_eq!(app.auth_error.as_deref(), Some("All fields are required"));
        assert!(!app.auth_pending);
    }

    #[tokio::test]
    async fn test_auth_failure_clears_password() {
        let mut app = test_app();
        app.navigate(Route::SignIn);
        app.auth_password = "secret".to_string();
        app.auth_pending = true;

        app.process_task_result(TaskResult::AuthFailed("Wrong password".to_string()));

        assert!(app.auth_password.is_empty());
        assert!(!app.auth_pending);
        assert_eq!(app.auth_error.as_deref(), Some("Wrong password"));
    }

    #[tokio::test]
    async fn test_sign_up_returns_to_sign_in_form() {
        let mut app = test_app();
        app.navigate(Route::SignIn);
        app.toggle_auth_mode();
        assert_eq!(app.auth_mode, AuthMode::SignUp);

        app.process_task_result(TaskResult::SignedUp("User created".to_string()));

        assert_eq!(app.auth_mode, AuthMode::SignIn);
        assert_eq!(app.status_message.as_deref(), Some("User created"));
    }

    #[tokio::test]
    async fn test_redirected_resolution_navigates_without_redirect_message() {
        let mut app = test_app();
        app.navigate(Route::Profile);

        app.process_task_result(TaskResult::Resolved(
            Route::Profile,
            Ok(Resolution::Redirected {
                to: Route::SignIn,
                reason: RedirectReason::MissingToken,
            }),
        ));

        assert_eq!(app.route(), Route::SignIn);
    }

    #[tokio::test]
    async fn test_resolution_error_goes_to_status_bar() {
        let mut app = test_app();
        app.navigate(Route::Gallery);

        app.process_task_result(TaskResult::Resolved(
            Route::Gallery,
            Err("connection refused".to_string()),
        ));

        assert_eq!(app.route(), Route::Gallery);
        assert!(app.status_message.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_stale_detail_is_ignored() {
        let mut app = test_app();
        app.navigate(Route::Artwork(2));

        app.process_task_result(TaskResult::DetailFailed(1, "gone".to_string()));

        assert!(app.detail_error.is_none());
    }

    // -------------------------------------------------------------------------
    // Gallery Selection Tests
    // -------------------------------------------------------------------------

    fn artwork(id: i64) -> Artwork {
        serde_json::from_value(serde_json::json!({
            "id": id, "title": format!("Work {}", id), "content": "", "image": "x.png"
        }))
        .unwrap()
    }

    #[test]
    fn test_gallery_selection_clamps() {
        let mut app = test_app();
        app.artworks = vec![artwork(1), artwork(2), artwork(3)];

        app.move_gallery_selection(1);
        assert_eq!(app.gallery_selection, 1);
        app.move_gallery_selection(PAGE_SCROLL_SIZE as isize);
        assert_eq!(app.gallery_selection, 2);
        app.move_gallery_selection(-(PAGE_SCROLL_SIZE as isize));
        assert_eq!(app.gallery_selection, 0);
        assert_eq!(app.selected_artwork().map(|a| a.id), Some(1));
    }

    #[test]
    fn test_gallery_selection_empty() {
        let mut app = test_app();
        app.move_gallery_selection(3);
        assert_eq!(app.gallery_selection, 0);
        assert!(app.selected_artwork().is_none());
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char(0, 'a'));
        assert!(can_add_name_char(49, 'z'));
        assert!(!can_add_name_char(50, 'a'));
        assert!(!can_add_name_char(0, '\x00'));
        assert!(!can_add_name_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_title_and_content_char() {
        assert!(can_add_title_char(99, 'a'));
        assert!(!can_add_title_char(100, 'a'));
        assert!(can_add_content_char(999, ' '));
        assert!(!can_add_content_char(1000, 'a'));
    }
}
