use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub competition_id: String,
    pub participant_name: String,
    pub score: f64,
    pub time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_formatted: Option<String>,
    pub results_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortedLeaderboardEntry {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub rank: usize,
    pub time_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedLeaderboard {
    pub competition_id: String,
    pub entries: Vec<LeaderboardEntry>,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionSummary {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct CompetitionLeaderboard {
    pub competition_id: String,
    pub label: String,
    pub published: bool,
    pub top_performers_count: usize,
    pub entries: Vec<SortedLeaderboardEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GroupedQuery {
    pub include_unpublished: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub entries: usize,
    pub competitions: usize,
    pub fetched_at: DateTime<Utc>,
}
