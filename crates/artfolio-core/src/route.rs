//! Navigation routes and the hook the session resolver redirects through.

use std::fmt;

/// A screen of the client, addressed the way the web client addresses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Gallery,
    Artwork(i64),
    EditArtwork(i64),
    Profile,
    SignIn,
    SignUp,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Gallery => "/".to_string(),
            Route::Artwork(id) => format!("/works/{}", id),
            Route::EditArtwork(id) => format!("/works/edit/{}", id),
            Route::Profile => "/profile".to_string(),
            Route::SignIn => "/auth/sign-in".to_string(),
            Route::SignUp => "/auth/sign-up".to_string(),
        }
    }

    /// Routes that host the credential forms
    pub fn is_auth(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receives redirects issued outside the UI loop.
pub trait Navigator: Send + Sync {
    fn redirect(&self, to: Route);
}

/// Tracks the current route so work tied to navigation runs once per change.
#[derive(Debug, Default)]
pub struct RouteTracker {
    current: Option<Route>,
}

impl RouteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    /// Record `route` as current. Returns `true` only when it differs from the
    /// previous route.
    pub fn enter(&mut self, route: Route) -> bool {
        if self.current.as_ref() == Some(&route) {
            return false;
        }
        self.current = Some(route);
        true
    }
}
