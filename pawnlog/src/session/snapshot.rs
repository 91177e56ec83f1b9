use pawnlog_api::models::User;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The reduced session state that survives a restart. Loading and error
/// flags are deliberately absent; they always start fresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

/// JSON-file persistence for the session snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new() -> Result<Self, SnapshotError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no cache directory available")
            })?
            .join("pawnlog");
        Self::at_dir(&cache_dir)
    }

    pub fn at_dir(dir: &Path) -> Result<Self, SnapshotError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join("session.json"),
        })
    }

    pub async fn load(&self) -> Result<Option<SessionSnapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path).await?;
        let snapshot: SessionSnapshot = serde_json::from_str(&data)?;
        Ok(Some(snapshot))
    }

    pub async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), SnapshotError> {
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}
