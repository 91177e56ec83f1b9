pub mod handshake;
pub mod snapshot;

use pawnlog_api::models::User;
use pawnlog_api::{ApiClient, ApiError};
use snapshot::{SessionSnapshot, SnapshotStore};
use std::sync::Arc;

/// Authentication state as observed by the UI.
///
/// `is_authenticated` tracks `user.is_some()` except transiently while
/// a fetch is in flight.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Holds who is signed in and runs the token/profile lifecycle against
/// the gateway. One instance per application root.
pub struct SessionStore {
    api: Arc<ApiClient>,
    snapshots: SnapshotStore,
    state: SessionState,
}

impl SessionStore {
    /// Rehydrate from the persisted snapshot; loading and error flags
    /// always start fresh.
    pub async fn new(api: Arc<ApiClient>, snapshots: SnapshotStore) -> Self {
        let snapshot = match snapshots.load().await {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load session snapshot: {}", e);
                SessionSnapshot::default()
            }
        };

        Self {
            api,
            snapshots,
            state: SessionState {
                user: snapshot.user,
                is_authenticated: snapshot.is_authenticated,
                is_loading: false,
                error: None,
            },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Exchange the authorization code for a token, then fetch the full
    /// profile. On any failure the token is left unset, the message is
    /// recorded, and the error is re-raised for the handshake flow.
    pub async fn login(&mut self, code: &str, state: &str) -> Result<(), ApiError> {
        self.state.is_loading = true;
        self.state.error = None;

        match self.exchange_and_fetch(code, state).await {
            Ok(user) => {
                self.state.user = Some(user);
                self.state.is_authenticated = true;
                self.state.is_loading = false;
                self.persist().await;
                Ok(())
            }
            Err(e) => {
                if let Err(clear_err) = self.api.set_token(None) {
                    tracing::warn!("Failed to clear token after login failure: {}", clear_err);
                }
                self.state.error = Some(e.surface("Login failed"));
                self.state.is_loading = false;
                Err(e)
            }
        }
    }

    async fn exchange_and_fetch(&self, code: &str, state: &str) -> Result<User, ApiError> {
        let login = self.api.exchange_callback(code, state).await?;
        self.api.set_token(Some(&login.access_token))?;
        self.api.my_profile().await
    }

    /// Remote logout is best-effort: a network failure is logged and
    /// swallowed, local state is cleared unconditionally.
    pub async fn logout(&mut self) {
        self.state.is_loading = true;

        if let Err(e) = self.api.logout().await {
            tracing::debug!("Logout request failed: {}", e);
        }

        if let Err(e) = self.api.set_token(None) {
            tracing::warn!("Failed to clear token on logout: {}", e);
        }
        self.state.user = None;
        self.state.is_authenticated = false;
        self.state.is_loading = false;
        self.persist().await;
    }

    /// Sync the store with the current credential. Without a token this
    /// resolves to anonymous without any network call; a failed profile
    /// fetch is treated as token invalidity and clears the token.
    pub async fn fetch_user(&mut self) {
        if !self.api.has_token() {
            self.state.user = None;
            self.state.is_authenticated = false;
            self.persist().await;
            return;
        }

        self.state.is_loading = true;
        self.state.error = None;

        match self.api.my_profile().await {
            Ok(user) => {
                self.state.user = Some(user);
                self.state.is_authenticated = true;
                self.state.is_loading = false;
                self.persist().await;
            }
            Err(e) => {
                if let Err(clear_err) = self.api.set_token(None) {
                    tracing::warn!("Failed to clear token: {}", clear_err);
                }
                self.state.user = None;
                self.state.is_authenticated = false;
                self.state.is_loading = false;
                self.state.error = Some(e.surface("Failed to fetch user"));
                self.persist().await;
            }
        }
    }

    /// Re-pull the profile from the platform. Unlike [`fetch_user`],
    /// failure keeps the authenticated state and only records the
    /// error.
    ///
    /// [`fetch_user`]: SessionStore::fetch_user
    pub async fn refresh_user(&mut self) {
        if !self.state.is_authenticated {
            return;
        }

        self.state.is_loading = true;
        self.state.error = None;

        match self.api.refresh_my_profile().await {
            Ok(user) => {
                self.state.user = Some(user);
                self.state.is_loading = false;
                self.persist().await;
            }
            Err(e) => {
                self.state.error = Some(e.surface("Failed to refresh user data"));
                self.state.is_loading = false;
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    async fn persist(&self) {
        let snapshot = SessionSnapshot {
            is_authenticated: self.state.is_authenticated,
            user: self.state.user.clone(),
        };
        if let Err(e) = self.snapshots.save(&snapshot).await {
            tracing::warn!("Failed to persist session snapshot: {}", e);
        }
    }
}
