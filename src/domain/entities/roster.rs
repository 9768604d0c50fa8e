use serde::{Deserialize, Serialize};

use crate::domain::entities::score::ScoreRecord;

/// Athlete metadata the leaderboard needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymnastProfile {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub team: Option<String>,
}

/// Entry in the apparatus catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apparatus {
    pub id: i64,
    pub name: String,
}

/// A stored score joined with the gymnast and apparatus it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventScoreRow {
    pub record: ScoreRecord,
    pub gymnast_name: String,
    pub category: String,
    pub team: Option<String>,
    pub apparatus_name: String,
}
