pub mod auth;
pub mod game;
pub mod user;

pub use auth::{LoginResponse, OAuthStart};
pub use game::{
    Game, GameFilters, GameListResponse, GameResult, GameStats, ResultCounts, SyncReport,
};
pub use user::{User, UserProfile, UserRating, UserRatings};
