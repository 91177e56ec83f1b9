use pawnlog_api::models::{Game, GameFilters, GameStats, SyncReport};
use pawnlog_api::{ApiClient, ApiError};
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SYNC_MAX_GAMES: u32 = 100;

/// Paginated game results plus the filters and aggregate stats that go
/// with them. `games` holds only the current page unless an append
/// fetch extends it.
#[derive(Debug, Clone)]
pub struct GameCatalogState {
    pub games: Vec<Game>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
    pub filters: GameFilters,
    pub stats: Option<GameStats>,
    pub is_loading: bool,
    pub is_syncing: bool,
    pub error: Option<String>,
}

impl Default for GameCatalogState {
    fn default() -> Self {
        Self {
            games: Vec::new(),
            total: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            has_more: false,
            filters: GameFilters::default(),
            stats: None,
            is_loading: false,
            is_syncing: false,
            error: None,
        }
    }
}

/// Client-side cache of the user's game history. One instance per
/// application root; pagination is 1-based and `total`/`has_more` are
/// taken from the server verbatim.
pub struct GameCatalogStore {
    api: Arc<ApiClient>,
    state: GameCatalogState,
}

impl GameCatalogStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: GameCatalogState::default(),
        }
    }

    pub fn state(&self) -> &GameCatalogState {
        &self.state
    }

    pub fn games(&self) -> &[Game] {
        &self.state.games
    }

    pub fn filters(&self) -> &GameFilters {
        &self.state.filters
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Load one page with the active filters. `append` extends the
    /// current list instead of replacing it (load-more). On failure the
    /// message is recorded and `games` is left untouched.
    pub async fn fetch_games(&mut self, page: u32, append: bool) {
        self.state.is_loading = true;
        self.state.error = None;

        match self
            .api
            .my_games(page, self.state.page_size, &self.state.filters)
            .await
        {
            Ok(response) => {
                if append {
                    self.state.games.extend(response.games);
                } else {
                    self.state.games = response.games;
                }
                self.state.total = response.total;
                self.state.page = response.page;
                self.state.has_more = response.has_more;
                self.state.is_loading = false;
            }
            Err(e) => {
                self.state.error = Some(e.surface("Failed to fetch games"));
                self.state.is_loading = false;
            }
        }
    }

    /// Pull new games from the platform, then unconditionally refetch
    /// page 1 and refresh stats, whatever the sync reported. Failure is
    /// recorded and re-raised.
    pub async fn sync_games(&mut self, max_games: u32) -> Result<SyncReport, ApiError> {
        self.state.is_syncing = true;
        self.state.error = None;

        let perf_type = self.state.filters.perf_type.clone();
        match self.api.sync_games(max_games, perf_type.as_deref()).await {
            Ok(report) => {
                tracing::info!(
                    "Synced games: {} fetched, {} saved",
                    report.fetched,
                    report.saved
                );
                self.fetch_games(1, false).await;
                self.fetch_stats().await;
                self.state.is_syncing = false;
                Ok(report)
            }
            Err(e) => {
                self.state.error = Some(e.surface("Failed to sync games"));
                self.state.is_syncing = false;
                Err(e)
            }
        }
    }

    /// Best-effort: stats are a non-critical enhancement, so failures
    /// are logged and never surfaced or propagated.
    pub async fn fetch_stats(&mut self) {
        match self.api.game_stats().await {
            Ok(stats) => self.state.stats = Some(stats),
            Err(e) => tracing::error!("Failed to fetch stats: {}", e),
        }
    }

    /// Replace the filters wholesale (callers merge if they want to),
    /// reset to page 1, and refetch immediately.
    pub async fn set_filters(&mut self, filters: GameFilters) {
        self.state.filters = filters;
        self.state.page = 1;
        self.fetch_games(1, false).await;
    }

    pub async fn reset_filters(&mut self) {
        self.set_filters(GameFilters::default()).await;
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }
}
