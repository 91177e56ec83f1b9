use crate::error::ApiError;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// Durable storage for the bearer token, so a restart resumes an
/// authenticated session without a new login.
pub struct TokenStore {
    token_path: PathBuf,
}

impl TokenStore {
    pub fn new() -> Result<Self, ApiError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| ApiError::TokenStorage("no cache directory available".to_string()))?
            .join("pawnlog");
        Self::at_dir(&cache_dir)
    }

    /// Store rooted at an explicit directory.
    pub fn at_dir(dir: &Path) -> Result<Self, ApiError> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                ApiError::TokenStorage(format!("Failed to create cache directory: {}", e))
            })?;
        }

        Ok(Self {
            token_path: dir.join("token.json"),
        })
    }

    pub fn save(&self, token: &str) -> Result<(), ApiError> {
        let json = serde_json::to_string_pretty(&StoredToken {
            token: token.to_string(),
        })?;

        fs::write(&self.token_path, json)
            .map_err(|e| ApiError::TokenStorage(format!("Failed to save token: {}", e)))?;

        // Token file is readable by the owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.token_path)
                .map_err(|e| {
                    ApiError::TokenStorage(format!("Failed to get file permissions: {}", e))
                })?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.token_path, perms).map_err(|e| {
                ApiError::TokenStorage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        Ok(())
    }

    pub fn load(&self) -> Result<Option<SecretString>, ApiError> {
        if !self.token_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.token_path)
            .map_err(|e| ApiError::TokenStorage(format!("Failed to read token: {}", e)))?;

        let stored: StoredToken = serde_json::from_str(&json)?;
        Ok(Some(SecretString::from(stored.token)))
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)
                .map_err(|e| ApiError::TokenStorage(format!("Failed to delete token: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn roundtrip_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at_dir(dir.path()).unwrap();

        assert!(store.load().unwrap().is_none());

        store.save("tok-123").unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), "tok-123");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn save_overwrites_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at_dir(dir.path()).unwrap();

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at_dir(dir.path()).unwrap();
        store.save("tok").unwrap();

        let mode = fs::metadata(dir.path().join("token.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
