//! # Identity Store
//!
//! Holds the signed-in user and their token, and turns every identity outcome
//! into a user-facing notice on the event bus.
//!
//! ## Overview
//!
//! - `login` / `register` establish a user and persist the token
//! - `restore_from_token` resolves a persisted token once at startup; failure
//!   leaves the session signed out without a notice
//! - `logout` clears memory before returning and never fails
//! - `add_to_playlist` toggles membership remotely, then re-fetches the user
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{IdentityGateway, IdentityStore, TokenStore};
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//! # use bridge_traits::SecureStore;
//! # async fn example(
//! #     gateway: Arc<dyn IdentityGateway>,
//! #     secure_store: Arc<dyn SecureStore>,
//! # ) -> core_auth::Result<()> {
//! let store = IdentityStore::new(
//!     gateway,
//!     TokenStore::new(secure_store, "token"),
//!     EventBus::new(100),
//!     "/",
//! );
//!
//! store.restore_from_token().await;
//! let signed_in = store.login("ada@example.com", "hunter2").await?;
//! assert_eq!(signed_in.navigate_to, "/");
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, AuthOperation, Result};
use crate::gateway::IdentityGateway;
use crate::token_store::TokenStore;
use crate::types::{AuthResponse, AuthToken, LoginRequest, RegisterRequest, SignedIn, User};
use core_catalog::SongId;
use core_runtime::events::{CoreEvent, EventBus, IdentityEvent, Notice};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn, Instrument};

/// Success toast when the server sends no message.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

pub const LOGOUT_MESSAGE: &str = "User Logged Out";

#[derive(Debug)]
struct IdentityState {
    user: Option<User>,
    token: Option<AuthToken>,
    /// True until the first restore attempt finishes.
    restoring: bool,
    /// Bumped on every change to `user`.
    generation: u64,
}

impl IdentityState {
    fn set_user(&mut self, user: Option<User>) {
        self.user = user;
        self.generation += 1;
    }
}

/// Counts in-flight login/register calls.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct IdentityStore {
    gateway: Arc<dyn IdentityGateway>,
    token_store: TokenStore,
    event_bus: EventBus,
    landing_route: String,
    state: RwLock<IdentityState>,
    busy: AtomicUsize,
}

impl IdentityStore {
    pub fn new(
        gateway: Arc<dyn IdentityGateway>,
        token_store: TokenStore,
        event_bus: EventBus,
        landing_route: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            token_store,
            event_bus,
            landing_route: landing_route.into(),
            state: RwLock::new(IdentityState {
                user: None,
                token: None,
                restoring: true,
                generation: 0,
            }),
            busy: AtomicUsize::new(0),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().user.is_some()
    }

    /// True until the startup restore attempt has finished.
    pub fn is_loading(&self) -> bool {
        self.state.read().restoring
    }

    /// True while a login or register request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) > 0
    }

    pub fn has_token(&self) -> bool {
        self.state.read().token.is_some()
    }

    pub fn is_saved(&self, song_id: &SongId) -> bool {
        self.state
            .read()
            .user
            .as_ref()
            .is_some_and(|user| user.has_saved(song_id))
    }

    /// Saved song ids of the current user; empty when signed out.
    pub fn saved_ids(&self) -> HashSet<SongId> {
        self.state
            .read()
            .user
            .as_ref()
            .map(User::saved_ids)
            .unwrap_or_default()
    }

    /// Bumped every time the user (and so the saved-id list) changes.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    fn token(&self) -> Option<AuthToken> {
        self.state.read().token.clone()
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn> {
        let _busy = BusyGuard::enter(&self.busy);
        let result = self
            .gateway
            .login(LoginRequest::new(email, password))
            .await;
        self.complete_sign_in(AuthOperation::Login, result).await
    }

    #[instrument(skip_all)]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<SignedIn> {
        let _busy = BusyGuard::enter(&self.busy);
        let result = self
            .gateway
            .register(RegisterRequest::new(name, email, password))
            .await;
        self.complete_sign_in(AuthOperation::Register, result).await
    }

    async fn complete_sign_in(
        &self,
        operation: AuthOperation,
        result: bridge_traits::error::Result<AuthResponse>,
    ) -> Result<SignedIn> {
        let response = match result {
            Ok(response) => response,
            Err(source) => {
                let error = AuthError::Gateway { operation, source };
                warn!(%operation, error = %error, "Sign-in failed");
                self.report_failure(&error);
                return Err(error);
            }
        };

        // The in-memory session stays valid even if persistence fails.
        if let Err(e) = self.token_store.save(&response.token).await {
            warn!(error = %e, "Signed in but the token could not be persisted");
        }

        let AuthResponse {
            token,
            user,
            message,
        } = response;

        {
            let mut state = self.state.write();
            state.token = Some(token);
            state.set_user(Some(user.clone()));
        }

        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| LOGIN_SUCCESS_MESSAGE.to_string());

        info!(%operation, user_id = %user.id, "User signed in");
        self.emit(IdentityEvent::SignedIn {
            user_id: user.id.to_string(),
        });
        self.event_bus.notify(Notice::success(message.clone()));

        Ok(SignedIn {
            user,
            message,
            navigate_to: self.landing_route.clone(),
        })
    }

    /// Resolves the persisted token, if any, to a user.
    ///
    /// Every failure is treated as "not signed in" and produces no notice.
    /// A sign-in that completes while this call is suspended wins.
    #[instrument(skip(self))]
    pub async fn restore_from_token(&self) -> Option<User> {
        let started_at = self.generation();

        let resolved = match self.token_store.load().await {
            Ok(Some(token)) => match self.gateway.me(token.clone()).await {
                Ok(user) => Some((token, user)),
                Err(e) => {
                    debug!(error = %e, "Persisted token did not resolve to a user");
                    None
                }
            },
            Ok(None) => {
                debug!("No persisted token, starting signed out");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not read persisted token");
                None
            }
        };

        let restored = {
            let mut state = self.state.write();
            state.restoring = false;

            match resolved {
                Some((token, user)) if state.generation == started_at => {
                    state.token = Some(token);
                    state.set_user(Some(user.clone()));
                    Some(user)
                }
                Some(_) => {
                    debug!("Identity changed during restore, discarding restored user");
                    None
                }
                None => None,
            }
        };

        if let Some(user) = &restored {
            info!(user_id = %user.id, "Session restored from persisted token");
            self.emit(IdentityEvent::Restored {
                user_id: user.id.to_string(),
            });
        }
        restored
    }

    /// Clears the user and token. Never fails.
    ///
    /// The in-memory sign-out, its event and the notice all happen before
    /// this returns. The returned future only deletes the persisted token;
    /// dropping it unpolled leaves the token on disk but the session signed out.
    #[instrument(skip(self))]
    pub fn logout(&self) -> impl Future<Output = ()> + Send + '_ {
        {
            let mut state = self.state.write();
            state.token = None;
            state.set_user(None);
        }

        info!("User signed out");
        self.emit(IdentityEvent::SignedOut);
        self.event_bus.notify(Notice::success(LOGOUT_MESSAGE));

        async move {
            if let Err(e) = self.token_store.delete().await {
                warn!(error = %e, "Persisted token could not be deleted during logout");
            }
        }
        .in_current_span()
    }

    /// Toggles `song_id` in the user's playlist, then re-fetches the user so
    /// the saved list comes from the server.
    ///
    /// On any failure the held user is left unchanged.
    #[instrument(skip(self, song_id), fields(song_id = %song_id))]
    pub async fn add_to_playlist(&self, song_id: SongId) -> Result<User> {
        let Some(token) = self.token() else {
            let error = AuthError::NotAuthenticated;
            warn!("Playlist change requested without a token");
            self.report_failure(&error);
            return Err(error);
        };

        let toggle = match self
            .gateway
            .toggle_song_in_playlist(song_id.clone(), token.clone())
            .await
        {
            Ok(toggle) => toggle,
            Err(source) => {
                let error = AuthError::Gateway {
                    operation: AuthOperation::TogglePlaylist,
                    source,
                };
                warn!(error = %error, "Playlist toggle failed");
                self.report_failure(&error);
                return Err(error);
            }
        };

        if let Some(message) = toggle.message.filter(|m| !m.trim().is_empty()) {
            self.event_bus.notify(Notice::success(message));
        }

        let user = self.gateway.me(token.clone()).await.map_err(|source| {
            let error = AuthError::Gateway {
                operation: AuthOperation::FetchUser,
                source,
            };
            warn!(error = %error, "Re-fetching user after playlist toggle failed");
            error
        })?;

        {
            let mut state = self.state.write();
            if state.token.as_ref() != Some(&token) {
                debug!("Signed out during playlist update, discarding user");
                return Err(AuthError::NotAuthenticated);
            }
            state.set_user(Some(user.clone()));
        }

        debug!(saved_count = user.playlist.len(), "Saved songs updated");
        self.emit(IdentityEvent::PlaylistUpdated {
            user_id: user.id.to_string(),
            saved_count: user.playlist.len(),
        });
        Ok(user)
    }

    fn report_failure(&self, error: &AuthError) {
        let message = error.user_message();
        self.emit(IdentityEvent::AuthError {
            message: message.clone(),
        });
        self.event_bus.notify(Notice::error(message));
    }

    fn emit(&self, event: IdentityEvent) {
        let _ = self.event_bus.emit(CoreEvent::Identity(event));
    }
}

impl fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("IdentityStore")
            .field("user", &state.user.as_ref().map(|u| &u.id))
            .field("has_token", &state.token.is_some())
            .field("restoring", &state.restoring)
            .field("generation", &state.generation)
            .field("token_store", &self.token_store)
            .finish()
    }
}
