// ── Session boundary ──
//
// Owns the signed-in identity and bearer token. The identity's email is
// the cache-partitioning key; crossing a session boundary (sign-out,
// account switch, rejected token) wipes the cache so one user's pages are
// never served to another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use secrecy::ExposeSecret;

use crate::backend::Backend;
use crate::cache::LocalCache;
use crate::error::CoreError;
use crate::model::{AuthTokens, Role, UserIdentity};
use crate::notify::{NotificationKind, Notifier};

/// Cache entry recording whose data the cache currently holds.
const SESSION_USER_KEY: &str = "session-user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn(UserIdentity),
    /// The backend rejected the token; the user must sign in again.
    Expired,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    backend: Arc<dyn Backend>,
    cache: Arc<dyn LocalCache>,
    notifier: Notifier,
    state: watch::Sender<SessionState>,
    tokens: Mutex<Option<AuthTokens>>,
    /// Bumped whenever cached data stops belonging to the current user.
    epoch: AtomicU64,
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>, cache: Arc<dyn LocalCache>, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self {
            inner: Arc::new(SessionInner {
                backend,
                cache,
                notifier,
                state,
                tokens: Mutex::new(None),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Start a session from a token pair.
    ///
    /// Rejects tokens whose `exp` claim is already in the past. Clears the
    /// cache when it holds another user's data.
    pub fn establish(&self, tokens: AuthTokens) -> Result<UserIdentity, CoreError> {
        let claims = eventdesk_api::decode_claims(tokens.access_token.expose_secret())?;
        if claims.exp.is_some_and(|exp| exp <= Utc::now().timestamp()) {
            return Err(CoreError::SessionExpired);
        }

        let identity = UserIdentity {
            email: claims.sub,
            role: Role::from(claims.role),
        };

        let cache = &self.inner.cache;
        let previous = cache.read(SESSION_USER_KEY);
        if previous.as_deref() != Some(identity.email.as_str()) {
            if let Some(previous) = previous {
                info!(from = %previous, to = %identity.email, "account switched; clearing cache");
            }
            cache.clear();
            cache.write(SESSION_USER_KEY, identity.email.clone());
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        }

        self.inner
            .backend
            .set_bearer_token(Some(tokens.access_token.clone()));
        *self.lock_tokens() = Some(tokens);
        self.inner
            .state
            .send_replace(SessionState::SignedIn(identity.clone()));

        info!(user = %identity.email, role = %identity.role, "session established");
        Ok(identity)
    }

    /// End the session: forget credentials and wipe the cache.
    pub fn sign_out(&self) {
        self.teardown();
        self.inner.state.send_replace(SessionState::SignedOut);
        info!("signed out");
    }

    /// Called when the backend rejects the bearer token.
    pub fn expire(&self) {
        if !self.is_signed_in() {
            debug!("expire on inactive session ignored");
            return;
        }
        warn!("session expired; re-authentication required");
        self.teardown();
        self.inner.state.send_replace(SessionState::Expired);
        self.inner.notifier.info(
            NotificationKind::ReauthRequired,
            "Your session has expired. Please sign in again.",
        );
    }

    /// Expire the session if `err` says the token is no longer valid.
    pub fn observe(&self, err: &CoreError) {
        if err.ends_session() {
            self.expire();
        }
    }

    fn teardown(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.cache.clear();
        self.inner.backend.set_bearer_token(None);
        *self.lock_tokens() = None;
    }

    fn lock_tokens(&self) -> std::sync::MutexGuard<'_, Option<AuthTokens>> {
        self.inner
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        match &*self.inner.state.borrow() {
            SessionState::SignedIn(identity) => Some(identity.clone()),
            SessionState::SignedOut | SessionState::Expired => None,
        }
    }

    pub fn require_user(&self) -> Result<UserIdentity, CoreError> {
        self.user().ok_or(CoreError::NotSignedIn)
    }

    /// Cache partition for the signed-in user.
    pub fn user_key(&self) -> Option<String> {
        self.user().map(|u| u.email)
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(*self.inner.state.borrow(), SessionState::SignedIn(_))
    }

    /// Changes on every session boundary; stores drop in-memory state
    /// recorded under an older epoch.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.lock_tokens().clone()
    }

    pub fn cache(&self) -> &Arc<dyn LocalCache> {
        &self.inner.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}
