pub mod leaderboard_cache;
pub mod scoring;
