use super::SessionStore;
use pawnlog_api::ApiError;
use thiserror::Error;
use url::Url;

/// Process-scoped stash for the anti-forgery state token. Written
/// before redirecting to the provider, consumed exactly once when a
/// callback's state matches.
#[derive(Debug, Default)]
pub struct StateStash {
    value: Option<String>,
}

impl StateStash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, state: String) {
        self.value = Some(state);
    }

    pub fn matches(&self, state: &str) -> bool {
        self.value.as_deref() == Some(state)
    }

    pub fn take(&mut self) -> Option<String> {
        self.value.take()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Error, Debug)]
pub enum HandshakeError {
    /// The provider reported an error on the callback; login was never
    /// attempted.
    #[error("{0}")]
    Provider(String),

    #[error("Invalid callback: missing code or state")]
    MissingParams,

    #[error("Invalid state parameter. Please try logging in again.")]
    StateMismatch,

    #[error("{message}")]
    Login {
        message: String,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The exchange succeeded; the caller should proceed to the profile
    /// view, replacing history so the callback cannot re-trigger.
    Completed,
    /// A previous invocation already ran; nothing was done.
    AlreadyHandled,
}

#[derive(Debug, Clone, Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// One-shot handler for the OAuth callback navigation. Guarded so that
/// duplicate invocations with the same parameters perform the code
/// exchange at most once.
#[derive(Debug, Default)]
pub struct CallbackHandshake {
    handled: bool,
}

impl CallbackHandshake {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run(
        &mut self,
        callback: &Url,
        stash: &mut StateStash,
        session: &mut SessionStore,
    ) -> Result<HandshakeOutcome, HandshakeError> {
        if self.handled {
            return Ok(HandshakeOutcome::AlreadyHandled);
        }
        self.handled = true;

        session.clear_error();

        let params = CallbackParams::from_url(callback);

        if let Some(error) = params.error {
            return Err(HandshakeError::Provider(
                params
                    .error_description
                    .unwrap_or_else(|| format!("Authentication error: {error}")),
            ));
        }

        let (code, state) = match (params.code, params.state) {
            (Some(code), Some(state)) => (code, state),
            _ => return Err(HandshakeError::MissingParams),
        };

        if !stash.matches(&state) {
            // Mismatch leaves the stashed value in place; only a
            // matching callback consumes it.
            return Err(HandshakeError::StateMismatch);
        }

        stash.take();

        session
            .login(&code, &state)
            .await
            .map_err(|e| HandshakeError::Login {
                message: e.surface("Login failed. Please try again."),
                source: e,
            })?;

        Ok(HandshakeOutcome::Completed)
    }
}
