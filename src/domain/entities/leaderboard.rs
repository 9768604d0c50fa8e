use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::roster::Apparatus;

/// One ranked line of an event leaderboard. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting
    pub rank: usize,
    pub gymnast_id: i64,
    pub name: String,
    pub team: Option<String>,
    pub category: String,
    /// Sum of final scores over the apparatus included by the active filter
    pub total_score: f64,
    /// Apparatus display name -> final score on that apparatus
    pub per_apparatus_score: BTreeMap<String, f64>,
}

/// Flat export row for tabular consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub rank: usize,
    pub name: String,
    pub category: String,
    pub team: Option<String>,
    pub total: f64,
    pub apparatus_count: usize,
}

impl From<&LeaderboardEntry> for SummaryRow {
    fn from(entry: &LeaderboardEntry) -> Self {
        SummaryRow {
            rank: entry.rank,
            name: entry.name.clone(),
            category: entry.category.clone(),
            team: entry.team.clone(),
            total: entry.total_score,
            apparatus_count: entry.per_apparatus_score.len(),
        }
    }
}

/// Values available to populate leaderboard filter controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub apparatus: Vec<Apparatus>,
}
