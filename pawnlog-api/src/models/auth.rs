use serde::{Deserialize, Serialize};

/// Response from starting the OAuth flow. `state` must be stashed by
/// the caller before navigating to `auth_url` and compared against the
/// callback's state parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthStart {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CallbackRequest<'a> {
    pub code: &'a str,
    pub state: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: String,
    pub username: String,
}
