use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rating in one perf category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRating {
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub games: u32,
    /// Recent rating progression.
    #[serde(default)]
    pub prog: i32,
    /// Rating deviation.
    pub rd: Option<i32>,
    /// Whether the rating is still provisional.
    pub prov: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRatings {
    pub bullet: Option<UserRating>,
    pub blitz: Option<UserRating>,
    pub rapid: Option<UserRating>,
    pub classical: Option<UserRating>,
    pub correspondence: Option<UserRating>,
    pub chess960: Option<UserRating>,
    pub puzzle: Option<UserRating>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub country: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub links: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub title: Option<String>,
    #[serde(default)]
    pub patron: bool,
    pub created_at_lichess: Option<DateTime<Utc>>,
    pub seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub play_time_total: u64,
    #[serde(default)]
    pub play_time_tv: u64,
    #[serde(default)]
    pub ratings: UserRatings,
    pub profile: Option<UserProfile>,
}
