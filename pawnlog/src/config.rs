use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("PAWNLOG_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("PAWNLOG").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("api_url is required".to_string());
        }
        if !self.api_url.starts_with("http") {
            return Err("api_url must be a valid HTTP(S) URL".to_string());
        }
        Ok(())
    }

    /// Base path for every API call.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_appends_api_path() {
        let settings = Settings {
            api_url: "http://localhost:8000/".to_string(),
        };
        assert_eq!(settings.api_base(), "http://localhost:8000/api");
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let settings = Settings {
            api_url: "ftp://example.com".to_string(),
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            api_url: String::new(),
        };
        assert!(settings.validate().is_err());
    }
}
