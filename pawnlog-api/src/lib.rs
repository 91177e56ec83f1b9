mod client;
mod error;
pub mod models;

pub use client::{ApiClient, TokenStore};
pub use error::ApiError;
