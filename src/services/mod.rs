pub mod leaderboard;
pub mod sheet_fetcher;
pub mod sheet_parser;
