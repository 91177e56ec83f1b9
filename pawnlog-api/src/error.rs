use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the credential. The gateway has already
    /// cleared the stored token by the time this surfaces.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Token storage error: {0}")]
    TokenStorage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Structured detail supplied by the server, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// User-facing message: the server's detail when present, otherwise
    /// the given fallback.
    pub fn surface(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}
