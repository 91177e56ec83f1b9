use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a finished game from the signed-in user's point of view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "draw" => Ok(Self::Draw),
            other => Err(format!("unknown game result: {other}")),
        }
    }
}

/// One finished game as stored by the server. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub rated: bool,
    pub variant: String,
    pub speed: String,
    pub perf_type: String,

    pub time_control_initial: Option<u32>,
    pub time_control_increment: Option<u32>,

    pub white_username: String,
    pub white_rating: Option<i32>,
    pub white_rating_diff: Option<i32>,
    pub black_username: String,
    pub black_rating: Option<i32>,
    pub black_rating_diff: Option<i32>,

    /// Which side the signed-in user played.
    pub user_color: String,
    pub result: GameResult,
    pub status: String,
    pub winner: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_move_at: Option<DateTime<Utc>>,

    pub opening_eco: Option<String>,
    pub opening_name: Option<String>,

    pub opponent_username: Option<String>,
    pub opponent_rating: Option<i32>,
    pub lichess_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameListResponse {
    pub games: Vec<Game>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

/// Server-side filters for the game list. An absent field means "no
/// constraint". Serialized straight into query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perf_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated: Option<bool>,
}

impl GameFilters {
    pub fn is_empty(&self) -> bool {
        self.perf_type.is_none() && self.result.is_none() && self.rated.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultCounts {
    #[serde(default)]
    pub win: u64,
    #[serde(default)]
    pub loss: u64,
    #[serde(default)]
    pub draw: u64,
}

/// Aggregate statistics over the user's synced games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub total: u64,
    pub results: ResultCounts,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
    pub win_rate: f64,
}

/// Counts reported by a sync run: games fetched from the platform and
/// games that were previously unseen and saved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncReport {
    pub fetched: u32,
    pub saved: u32,
}
