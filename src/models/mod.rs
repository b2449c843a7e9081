pub mod leaderboard;
pub mod sheet;
