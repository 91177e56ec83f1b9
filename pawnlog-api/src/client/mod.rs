mod token_store;

pub use token_store::TokenStore;

use crate::error::ApiError;
use crate::models::auth::{CallbackRequest, LoginResponse, OAuthStart};
use crate::models::game::{Game, GameFilters, GameListResponse, GameStats, SyncReport};
use crate::models::user::User;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Error body shape used by the server for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

type InvalidatedHook = Box<dyn Fn() + Send + Sync>;

/// The one shared HTTP client for the remote API.
///
/// Owns the bearer token: attaches it to every outgoing request,
/// mirrors it into the [`TokenStore`], and clears it everywhere on any
/// 401 response. Session invalidation is reported through an injectable
/// hook rather than by touching navigation state, so the application
/// root decides how to react.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
    store: TokenStore,
    invalidated: RwLock<Option<InvalidatedHook>>,
}

impl ApiClient {
    /// Build the client and resume any previously persisted token, so a
    /// restart comes back authenticated without a new login.
    pub fn new(base_url: impl Into<String>, store: TokenStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let token = store.load()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(token),
            store,
            invalidated: RwLock::new(None),
        })
    }

    /// Register the hook invoked whenever a 401 forces the session to
    /// be torn down. At most one hook is active; a new registration
    /// replaces the previous one.
    pub fn on_session_invalidated<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.invalidated.write().expect("hook lock poisoned") = Some(Box::new(hook));
    }

    /// Set or clear the bearer token, in memory and in durable storage
    /// together.
    pub fn set_token(&self, token: Option<&str>) -> Result<(), ApiError> {
        match token {
            Some(t) => self.store.save(t)?,
            None => self.store.clear()?,
        }
        *self.token.write().expect("token lock poisoned") =
            token.map(|t| SecretString::from(t.to_string()));
        Ok(())
    }

    pub fn token(&self) -> Option<SecretString> {
        self.token.read().expect("token lock poisoned").clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Tear down the credential after a 401: memory, durable storage,
    /// then the invalidation hook.
    fn clear_session(&self) {
        *self.token.write().expect("token lock poisoned") = None;
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored token after 401: {}", e);
        }
        if let Some(hook) = self.invalidated.read().expect("hook lock poisoned").as_ref() {
            hook();
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match &*self.token.read().expect("token lock poisoned") {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Received 401, invalidating session");
            self.clear_session();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let detail = response.json::<ErrorBody>().await.ok().map(|b| b.detail);
            return Err(ApiError::Api { status, detail });
        }

        Ok(response)
    }

    // Auth

    pub async fn start_oauth(&self) -> Result<OAuthStart, ApiError> {
        let resp = self.execute(self.http.get(self.url("/auth/login"))).await?;
        Ok(resp.json().await?)
    }

    pub async fn exchange_callback(
        &self,
        code: &str,
        state: &str,
    ) -> Result<LoginResponse, ApiError> {
        let req = self
            .http
            .post(self.url("/auth/callback"))
            .json(&CallbackRequest { code, state });
        let resp = self.execute(req).await?;
        Ok(resp.json().await?)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("/auth/logout")))
            .await?;
        Ok(())
    }

    // Users

    pub async fn my_profile(&self) -> Result<User, ApiError> {
        let resp = self.execute(self.http.get(self.url("/users/me"))).await?;
        Ok(resp.json().await?)
    }

    pub async fn refresh_my_profile(&self) -> Result<User, ApiError> {
        let resp = self
            .execute(self.http.post(self.url("/users/me/refresh")))
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn user_profile(&self, username: &str) -> Result<User, ApiError> {
        let resp = self
            .execute(self.http.get(self.url(&format!("/users/{}", username))))
            .await?;
        Ok(resp.json().await?)
    }

    // Games

    pub async fn my_games(
        &self,
        page: u32,
        page_size: u32,
        filters: &GameFilters,
    ) -> Result<GameListResponse, ApiError> {
        let req = self
            .http
            .get(self.url("/games/me"))
            .query(&[("page", page), ("page_size", page_size)])
            .query(filters);
        let resp = self.execute(req).await?;
        Ok(resp.json().await?)
    }

    pub async fn sync_games(
        &self,
        max_games: u32,
        perf_type: Option<&str>,
    ) -> Result<SyncReport, ApiError> {
        let mut req = self
            .http
            .post(self.url("/games/me/sync"))
            .query(&[("max_games", max_games)]);
        if let Some(perf_type) = perf_type {
            req = req.query(&[("perf_type", perf_type)]);
        }
        let resp = self.execute(req).await?;
        Ok(resp.json().await?)
    }

    pub async fn game_stats(&self) -> Result<GameStats, ApiError> {
        let resp = self
            .execute(self.http.get(self.url("/games/stats/me")))
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn game(&self, game_id: &str) -> Result<Game, ApiError> {
        let resp = self
            .execute(self.http.get(self.url(&format!("/games/me/{}", game_id))))
            .await?;
        Ok(resp.json().await?)
    }
}
