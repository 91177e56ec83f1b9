#![allow(dead_code)]

use httpmock::MockServer;
use pawnlog::games::GameCatalogStore;
use pawnlog::session::snapshot::SnapshotStore;
use pawnlog::session::SessionStore;
use pawnlog_api::{ApiClient, TokenStore};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// A mock API server plus a gateway rooted in a temp directory, so each
/// test gets isolated durable storage.
pub struct Harness {
    pub server: MockServer,
    pub api: Arc<ApiClient>,
    pub dir: TempDir,
}

pub async fn harness() -> Harness {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(
        ApiClient::new(server.base_url(), TokenStore::at_dir(dir.path()).unwrap()).unwrap(),
    );
    Harness { server, api, dir }
}

impl Harness {
    pub async fn session(&self) -> SessionStore {
        SessionStore::new(
            self.api.clone(),
            SnapshotStore::at_dir(self.dir.path()).unwrap(),
        )
        .await
    }

    pub fn games(&self) -> GameCatalogStore {
        GameCatalogStore::new(self.api.clone())
    }

    pub fn token_store(&self) -> TokenStore {
        TokenStore::at_dir(self.dir.path()).unwrap()
    }
}

pub fn user_json(username: &str) -> serde_json::Value {
    json!({
        "id": username,
        "username": username,
        "title": null,
        "patron": false,
        "play_time_total": 7200,
        "play_time_tv": 0,
        "ratings": {
            "blitz": {"rating": 1712, "games": 431, "prog": -8},
            "rapid": {"rating": 1845, "games": 102, "prog": 15}
        },
        "profile": {"country": "NO", "bio": null}
    })
}

pub fn login_json(token: &str, username: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user_id": username,
        "username": username
    })
}

pub fn game_json(id: &str, result: &str) -> serde_json::Value {
    json!({
        "id": id,
        "rated": true,
        "variant": "standard",
        "speed": "blitz",
        "perf_type": "blitz",
        "time_control_initial": 300,
        "time_control_increment": 3,
        "white_username": "testuser",
        "white_rating": 1700,
        "white_rating_diff": 8,
        "black_username": "opponent",
        "black_rating": 1688,
        "black_rating_diff": -8,
        "user_color": "white",
        "result": result,
        "status": "mate",
        "winner": "white",
        "created_at": "2026-01-15T18:30:00Z",
        "last_move_at": "2026-01-15T18:42:00Z",
        "opening_eco": "B01",
        "opening_name": "Scandinavian Defense",
        "opponent_username": "opponent",
        "opponent_rating": 1688,
        "lichess_url": format!("https://lichess.org/{id}")
    })
}

pub fn game_page_json(ids: &[&str], total: u64, page: u32, has_more: bool) -> serde_json::Value {
    let games: Vec<_> = ids.iter().map(|id| game_json(id, "win")).collect();
    json!({
        "games": games,
        "total": total,
        "page": page,
        "page_size": 10,
        "has_more": has_more
    })
}

pub fn stats_json(total: u64) -> serde_json::Value {
    json!({
        "total": total,
        "results": {"win": 40, "loss": 35, "draw": 12},
        "by_type": {"blitz": 60, "rapid": 27},
        "win_rate": 46.0
    })
}
