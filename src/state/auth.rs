//! Session/auth store: the single source of truth for who is logged in.
//!
//! LIFECYCLE
//! =========
//! `Uninitialized -> Rehydrating -> {Authenticated, Anonymous}`, then
//! `Authenticated -> Anonymous` on logout and `Anonymous -> Authenticated`
//! on login. Rehydration runs at most once per store and never fails: a
//! missing, partial or corrupted durable session becomes `Anonymous` and
//! the durable entries are cleared.
//!
//! CONCURRENCY
//! ===========
//! State lives in a `watch` channel so every consumer reads the same
//! current value and can await changes. A logout racing a login resolves
//! last-write-wins.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{ApiError, AuthError, MalformedLocalStateError, StorageError};
use crate::net::api;
use crate::net::client::{ApiClient, CredentialSource};
use crate::net::types::LoginResponse;
use crate::storage::{AUTH_TOKEN_KEY, AUTH_USER_KEY, DurableStore};

/// The currently authenticated operator.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl From<LoginResponse> for Session {
    fn from(user: LoginResponse) -> Self {
        Self { user_id: user.id, name: user.name, email: user.email, token: user.token }
    }
}

/// Profile persisted under `authUser`; the credential lives only in `authToken`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Uninitialized,
    Rehydrating,
    Authenticated(Session),
    Anonymous,
}

/// Read-only snapshot handed to the route guard and UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub phase: AuthPhase,
}

impl AuthState {
    #[must_use]
    pub fn authenticated(session: Session) -> Self {
        Self { phase: AuthPhase::Authenticated(session) }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { phase: AuthPhase::Anonymous }
    }

    /// `true` until rehydration has produced a definite answer.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, AuthPhase::Uninitialized | AuthPhase::Rehydrating)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, AuthPhase::Authenticated(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            AuthPhase::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Rebuild a session from the two durable entries.
///
/// `Ok(None)` when either entry is missing.
///
/// # Errors
///
/// Returns `MalformedLocalStateError` when both entries exist but do not
/// form a valid session, or storage cannot be read.
pub fn restore_session(storage: &dyn DurableStore) -> Result<Option<Session>, MalformedLocalStateError> {
    let token = storage.get(AUTH_TOKEN_KEY)?;
    let profile = storage.get(AUTH_USER_KEY)?;
    let (Some(token), Some(profile)) = (token, profile) else {
        return Ok(None);
    };
    if token.trim().is_empty() {
        return Err(MalformedLocalStateError::EmptyCredential);
    }
    let user: StoredUser = serde_json::from_str(&profile)?;
    Ok(Some(Session { user_id: user.id, name: user.name, email: user.email, token }))
}

pub struct SessionStore {
    storage: Arc<dyn DurableStore>,
    client: ApiClient,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    /// `client` is used for the login call; it needs no credential source.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStore>, client: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { storage, client, state }
    }

    /// Client that attaches this store's credential to every call.
    #[must_use]
    pub fn authorized_client(self: &Arc<Self>) -> ApiClient {
        self.client.clone().with_credentials(self.clone())
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// Restore the session persisted by a previous process.
    ///
    /// Only the first call does any work; later calls return the current state.
    pub fn rehydrate(&self) -> AuthState {
        let started = self.state.send_if_modified(|state| {
            if state.phase == AuthPhase::Uninitialized {
                state.phase = AuthPhase::Rehydrating;
                true
            } else {
                false
            }
        });
        if !started {
            tracing::debug!("rehydration already ran");
            return self.snapshot();
        }

        let phase = match restore_session(self.storage.as_ref()) {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user_id, "session restored from storage");
                AuthPhase::Authenticated(session)
            }
            Ok(None) => {
                self.clear_durable();
                tracing::info!("no stored session");
                AuthPhase::Anonymous
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed stored session");
                self.clear_durable();
                AuthPhase::Anonymous
            }
        };
        let state = AuthState { phase };
        self.state.send_replace(state.clone());
        state
    }

    /// Resolve once rehydration has finished, starting it if nothing has yet.
    pub async fn wait_until_loaded(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        if rx.borrow().phase == AuthPhase::Uninitialized {
            self.rehydrate();
        }
        let loaded = rx.wait_for(|state| !state.is_loading()).await.map(|s| s.clone());
        loaded.unwrap_or_else(|_| self.snapshot())
    }

    /// Authenticate against the API and persist the resulting session.
    ///
    /// A failed call changes nothing. If persisting fails, the half-written
    /// entries are removed and any previous session is written back so
    /// storage keeps matching the in-memory state. If that also fails the
    /// store drops to `Anonymous`.
    ///
    /// # Errors
    ///
    /// - `AuthError::Api` when the login call fails (not retried)
    /// - `AuthError::Storage` when the session cannot be persisted
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = match api::login_user(&self.client, email, password).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, status = ?err.status(), "login failed");
                return Err(err.into());
            }
        };
        let session = Session::from(user);

        if let Err(err) = self.persist(&session) {
            tracing::warn!(error = %err, "could not persist session");
            self.clear_durable();
            self.restore_previous();
            return Err(err.into());
        }

        self.state.send_replace(AuthState::authenticated(session.clone()));
        tracing::info!(user_id = %session.user_id, "logged in");
        Ok(session)
    }

    /// Drop the session from memory and durable storage.
    pub fn logout(&self) {
        self.state.send_replace(AuthState::anonymous());
        self.clear_durable();
        tracing::info!("logged out");
    }

    /// Log out when `err` is a 401; returns whether it did.
    pub fn logout_if_unauthorized(&self, err: &ApiError) -> bool {
        if err.is_unauthorized() && self.is_authenticated() {
            self.logout();
            return true;
        }
        false
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let profile = StoredUser {
            id: session.user_id.clone(),
            name: session.name.clone(),
            email: session.email.clone(),
        };
        let profile = serde_json::to_string(&profile).map_err(|e| StorageError::Io {
            key: AUTH_USER_KEY.to_owned(),
            source: std::io::Error::other(e),
        })?;
        self.storage.set(AUTH_TOKEN_KEY, &session.token)?;
        self.storage.set(AUTH_USER_KEY, &profile)
    }

    /// Write the current in-memory session back after a failed persist.
    fn restore_previous(&self) {
        let Some(previous) = self.session() else {
            return;
        };
        if let Err(err) = self.persist(&previous) {
            tracing::warn!(error = %err, "could not restore previous session; logging out");
            self.clear_durable();
            self.state.send_replace(AuthState::anonymous());
        }
    }

    fn clear_durable(&self) {
        for key in [AUTH_TOKEN_KEY, AUTH_USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::warn!(error = %err, "could not remove stored session entry");
            }
        }
    }
}

impl CredentialSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        {
            let state = self.state.borrow();
            match &state.phase {
                AuthPhase::Authenticated(session) => return Some(session.token.clone()),
                AuthPhase::Anonymous => return None,
                AuthPhase::Uninitialized | AuthPhase::Rehydrating => {}
            }
        }
        // Until rehydration settles, fall back to the durable credential.
        self.storage.get(AUTH_TOKEN_KEY).ok().flatten()
    }
}
