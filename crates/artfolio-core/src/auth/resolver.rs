//! Session resolution: stored token in, signed-in user (or redirect) out.
//!
//! A resolution cycle runs on start and on every navigation:
//!
//! 1. No stored token: redirect to sign-in, whatever the current route is.
//! 2. Token present: ask the verifier.
//!    - Rejected: clear the stored token, clear the session, redirect to sign-in.
//!    - Accepted: publish the session and write the same token back.
//!
//! Cycles may overlap when navigation is quick. Each cycle takes a ticket
//! and only the most recently started one may apply its outcome. Signing out
//! invalidates every outstanding ticket.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::models::VerifiedUser;
use crate::route::{Navigator, Route};

use super::session::{SessionStore, UserSession};
use super::storage::{TokenStorage, TOKEN_KEY};

/// Verdict of the remote verifier on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Accepted(VerifiedUser),
    Rejected,
}

/// Exchanges a credential token for a user identity.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Verification>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    MissingToken,
    Rejected,
}

/// Outcome of one resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Authenticated(UserSession),
    Redirected { to: Route, reason: RedirectReason },
    /// A newer cycle started before this one finished; nothing was applied.
    Superseded,
}

#[derive(Clone)]
pub struct SessionResolver {
    verifier: Arc<dyn Verifier>,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    store: SessionStore,
    generation: Arc<Mutex<u64>>,
}

impl SessionResolver {
    pub fn new(
        verifier: Arc<dyn Verifier>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
        store: SessionStore,
    ) -> Self {
        Self {
            verifier,
            storage,
            navigator,
            store,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Run one resolution cycle for `route`.
    ///
    /// Errors (storage unreadable, network failure, malformed verify
    /// response) leave the session, the stored token and the route as they
    /// were.
    pub async fn resolve(&self, route: &Route) -> Result<Resolution> {
        let ticket = self.next_ticket();

        let token = self
            .storage
            .read(TOKEN_KEY)
            .context("Failed to read stored token")?
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            return Ok(self.settle_missing(ticket, route));
        };

        let verification = self
            .verifier
            .verify(&token)
            .await
            .context("Session verification failed")?;

        Ok(self.settle(ticket, route, &token, verification))
    }

    /// Forget the signed-in user and the stored token.
    ///
    /// Cycles already in flight are superseded, so a verification that
    /// started before sign-out cannot restore the session.
    pub fn sign_out(&self) -> Result<()> {
        let mut generation = self.lock_generation();
        *generation += 1;
        self.store.clear();
        self.storage
            .clear(TOKEN_KEY)
            .context("Failed to clear stored token")?;
        info!("Signed out");
        Ok(())
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_ticket(&self) -> u64 {
        let mut generation = self.lock_generation();
        *generation += 1;
        *generation
    }

    fn settle_missing(&self, ticket: u64, route: &Route) -> Resolution {
        // Held while applying so sign-out cannot interleave
        let generation = self.lock_generation();
        if *generation != ticket {
            return Resolution::Superseded;
        }
        debug!(%route, "No stored token");
        self.redirect(RedirectReason::MissingToken)
    }

    fn settle(&self, ticket: u64, route: &Route, token: &str, verification: Verification) -> Resolution {
        let generation = self.lock_generation();
        if *generation != ticket {
            debug!(%route, ticket, "Resolution superseded by a newer navigation");
            return Resolution::Superseded;
        }

        match verification {
            Verification::Rejected => {
                warn!(%route, "Stored token rejected by verifier");
                if let Err(e) = self.storage.clear(TOKEN_KEY) {
                    warn!(error = %e, "Failed to clear rejected token");
                }
                self.redirect(RedirectReason::Rejected)
            }
            Verification::Accepted(user) => {
                let session = UserSession::from_verified(user, token);
                info!(%route, username = %session.username, "Session resolved");
                self.store.set(session.clone());
                if let Err(e) = self.storage.write(TOKEN_KEY, token) {
                    warn!(error = %e, "Failed to re-persist token");
                }
                Resolution::Authenticated(session)
            }
        }
    }

    fn redirect(&self, reason: RedirectReason) -> Resolution {
        self.store.clear();
        self.navigator.redirect(Route::SignIn);
        Resolution::Redirected {
            to: Route::SignIn,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;
    use crate::auth::storage::MemoryTokenStore;
    use crate::route::RouteTracker;

    // -------------------------------------------------------------------------
    // Test doubles
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingNavigator {
        redirects: Mutex<Vec<Route>>,
    }

    impl RecordingNavigator {
        fn redirects(&self) -> Vec<Route> {
            self.redirects.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, to: Route) {
            self.redirects.lock().unwrap().push(to);
        }
    }

    #[derive(Clone, Copy)]
    enum Reply {
        Accept,
        Reject,
        Fail,
    }

    /// Answers from a script; repeats the last reply once the script runs out.
    struct ScriptedVerifier {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
    }

    impl ScriptedVerifier {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next_reply(&self) -> Reply {
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().copied()
            };
            reply.unwrap_or(Reply::Accept)
        }
    }

    fn ada() -> VerifiedUser {
        VerifiedUser {
            id: "1".to_string(),
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
        }
    }

    #[async_trait]
    impl Verifier for ScriptedVerifier {
        async fn verify(&self, _token: &str) -> Result<Verification> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.next_reply() {
                Reply::Accept => Ok(Verification::Accepted(ada())),
                Reply::Reject => Ok(Verification::Rejected),
                Reply::Fail => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    struct Harness {
        resolver: SessionResolver,
        verifier: Arc<ScriptedVerifier>,
        storage: Arc<MemoryTokenStore>,
        navigator: Arc<RecordingNavigator>,
    }

    fn harness(token: Option<&str>, replies: Vec<Reply>) -> Harness {
        let verifier = Arc::new(ScriptedVerifier::new(replies));
        let storage = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let resolver = SessionResolver::new(
            verifier.clone(),
            storage.clone(),
            navigator.clone(),
            SessionStore::new(),
        );
        Harness {
            resolver,
            verifier,
            storage,
            navigator,
        }
    }

    fn expected_session() -> UserSession {
        UserSession {
            id: "1".to_string(),
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            token: "tok-1".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Missing token
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_no_token_redirects_to_sign_in() {
        let h = harness(None, vec![Reply::Accept]);

        let res = h.resolver.resolve(&Route::Gallery).await.unwrap();

        assert_eq!(
            res,
            Resolution::Redirected {
                to: Route::SignIn,
                reason: RedirectReason::MissingToken
            }
        );
        assert_eq!(h.resolver.store().get(), None);
        assert_eq!(h.navigator.redirects(), vec![Route::SignIn]);
        assert_eq!(h.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_token_redirects_even_from_auth_routes() {
        let h = harness(None, vec![Reply::Accept]);

        h.resolver.resolve(&Route::SignIn).await.unwrap();
        h.resolver.resolve(&Route::SignUp).await.unwrap();

        assert_eq!(h.navigator.redirects(), vec![Route::SignIn, Route::SignIn]);
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_missing() {
        let h = harness(Some(""), vec![Reply::Accept]);

        let res = h.resolver.resolve(&Route::Profile).await.unwrap();

        assert!(matches!(
            res,
            Resolution::Redirected { reason: RedirectReason::MissingToken, .. }
        ));
        assert_eq!(h.verifier.calls(), 0);
    }

    // -------------------------------------------------------------------------
    // Rejected token
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_rejected_token_is_cleared() {
        let h = harness(Some("tok-1"), vec![Reply::Accept, Reply::Reject]);

        // Signed in first, then the server revokes the token
        h.resolver.resolve(&Route::Gallery).await.unwrap();
        assert!(h.resolver.store().is_authenticated());

        let res = h.resolver.resolve(&Route::Profile).await.unwrap();

        assert_eq!(
            res,
            Resolution::Redirected {
                to: Route::SignIn,
                reason: RedirectReason::Rejected
            }
        );
        assert_eq!(h.resolver.store().get(), None);
        assert_eq!(h.storage.read(TOKEN_KEY).unwrap(), None);
        assert_eq!(h.navigator.redirects(), vec![Route::SignIn]);
    }

    // -------------------------------------------------------------------------
    // Accepted token
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_accepted_token_publishes_session() {
        let h = harness(Some("tok-1"), vec![Reply::Accept]);

        let res = h.resolver.resolve(&Route::Gallery).await.unwrap();

        assert_eq!(res, Resolution::Authenticated(expected_session()));
        assert_eq!(h.resolver.store().get(), Some(expected_session()));
        assert_eq!(h.storage.read(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(h.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let h = harness(Some("tok-1"), vec![Reply::Accept]);
        let mut rx = h.resolver.store().subscribe();

        h.resolver.resolve(&Route::Gallery).await.unwrap();
        let first = h.resolver.store().get();
        rx.borrow_and_update();

        h.resolver.resolve(&Route::Gallery).await.unwrap();

        assert_eq!(h.resolver.store().get(), first);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(h.verifier.calls(), 2);
    }

    // -------------------------------------------------------------------------
    // Failures
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_verifier_failure_leaves_state_untouched() {
        let h = harness(Some("tok-1"), vec![Reply::Accept, Reply::Fail]);
        h.resolver.resolve(&Route::Gallery).await.unwrap();

        let err = h.resolver.resolve(&Route::Profile).await.unwrap_err();

        assert!(err.to_string().contains("Session verification failed"));
        assert_eq!(h.resolver.store().get(), Some(expected_session()));
        assert_eq!(h.storage.read(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(h.navigator.redirects().is_empty());
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_verification_runs_once_per_navigation() {
        let h = harness(Some("tok-1"), vec![Reply::Accept]);
        let mut tracker = RouteTracker::new();

        // Each route is "rendered" several times; only changes resolve
        for route in [Route::Gallery, Route::Gallery, Route::Gallery, Route::Artwork(3), Route::Artwork(3)] {
            if tracker.enter(route.clone()) {
                h.resolver.resolve(&route).await.unwrap();
            }
        }

        assert_eq!(h.verifier.calls(), 2);
        assert_eq!(h.resolver.store().get(), Some(expected_session()));
    }

    // -------------------------------------------------------------------------
    // Overlapping cycles
    // -------------------------------------------------------------------------

    /// First call waits for a release signal and returns `gated`; later calls accept.
    struct GatedVerifier {
        gated: Verification,
        started: Mutex<Option<oneshot::Sender<()>>>,
        release: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl GatedVerifier {
        fn new(gated: Verification) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
            let (started_tx, started_rx) = oneshot::channel();
            let (release_tx, release_rx) = oneshot::channel();
            let verifier = Self {
                gated,
                started: Mutex::new(Some(started_tx)),
                release: Mutex::new(Some(release_rx)),
            };
            (verifier, started_rx, release_tx)
        }
    }

    #[async_trait]
    impl Verifier for GatedVerifier {
        async fn verify(&self, _token: &str) -> Result<Verification> {
            let gate = self.release.lock().unwrap().take();
            match gate {
                Some(release) => {
                    if let Some(started) = self.started.lock().unwrap().take() {
                        let _ = started.send(());
                    }
                    let _ = release.await;
                    Ok(self.gated.clone())
                }
                None => Ok(Verification::Accepted(ada())),
            }
        }
    }

    #[tokio::test]
    async fn test_superseded_cycle_applies_nothing() {
        let (verifier, started_rx, release_tx) = GatedVerifier::new(Verification::Rejected);
        let verifier = Arc::new(verifier);
        let storage = Arc::new(MemoryTokenStore::with_token("tok-1"));
        let navigator = Arc::new(RecordingNavigator::default());
        let resolver = SessionResolver::new(
            verifier,
            storage.clone(),
            navigator.clone(),
            SessionStore::new(),
        );

        let slow = resolver.clone();
        let handle = tokio::spawn(async move { slow.resolve(&Route::Gallery).await });
        started_rx.await.unwrap();

        let newer = resolver.resolve(&Route::Profile).await.unwrap();
        assert_eq!(newer, Resolution::Authenticated(expected_session()));

        release_tx.send(()).unwrap();
        let older = handle.await.unwrap().unwrap();

        assert_eq!(older, Resolution::Superseded);
        assert_eq!(resolver.store().get(), Some(expected_session()));
        assert_eq!(storage.read(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_supersedes_cycle_in_flight() {
        let (verifier, started_rx, release_tx) = GatedVerifier::new(Verification::Accepted(ada()));
        let storage = Arc::new(MemoryTokenStore::with_token("tok-1"));
        let navigator = Arc::new(RecordingNavigator::default());
        let resolver = SessionResolver::new(
            Arc::new(verifier),
            storage.clone(),
            navigator.clone(),
            SessionStore::new(),
        );

        let pending = resolver.clone();
        let handle = tokio::spawn(async move { pending.resolve(&Route::Profile).await });
        started_rx.await.unwrap();

        resolver.sign_out().unwrap();
        release_tx.send(()).unwrap();
        let stale = handle.await.unwrap().unwrap();

        assert_eq!(stale, Resolution::Superseded);
        assert_eq!(resolver.store().get(), None);
        assert_eq!(storage.read(TOKEN_KEY).unwrap(), None);
        assert!(navigator.redirects().is_empty());
    }

    #[test]
    fn test_sign_out_without_token_is_ok() {
        let h = harness(None, vec![Reply::Accept]);
        h.resolver.sign_out().unwrap();
        assert_eq!(h.resolver.store().get(), None);
        assert_eq!(h.storage.read(TOKEN_KEY).unwrap(), None);
    }
}
