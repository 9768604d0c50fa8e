pub mod leaderboard;
pub mod roster;
pub mod score;

pub use leaderboard::{FilterOptions, LeaderboardEntry, SummaryRow};
pub use roster::{Apparatus, EventScoreRow, GymnastProfile};
pub use score::{ScoreComponents, ScoreInput, ScoreKey, ScoreRecord, ScoreSubmission};
