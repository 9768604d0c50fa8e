pub mod aggregator;
pub mod calculator;
pub mod filter;

pub use aggregator::LeaderboardAggregator;
pub use calculator::{average_pair, round2, select_middle, ScoreBreakdown, ScoreCalculator};
pub use filter::LeaderboardFilter;
