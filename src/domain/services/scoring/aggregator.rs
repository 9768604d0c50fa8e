use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::domain::entities::leaderboard::{LeaderboardEntry, SummaryRow};
use crate::domain::entities::roster::EventScoreRow;
use crate::domain::services::scoring::{LeaderboardFilter, ScoreCalculator};

/// Folds an event's score rows into ranked per-gymnast totals
#[derive(Debug, Clone, Default)]
pub struct LeaderboardAggregator {
    calculator: ScoreCalculator,
}

impl LeaderboardAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the leaderboard for one event.
    ///
    /// Rows rejected by `filter` contribute nothing to any total. Entries are
    /// ordered by total descending; equal totals keep the order in which the
    /// gymnast first appears in `rows` (stores return rows by gymnast id).
    pub fn aggregate(
        &self,
        rows: &[EventScoreRow],
        filter: &LeaderboardFilter,
    ) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        let mut index_by_gymnast: HashMap<i64, usize> = HashMap::new();
        let mut included = 0usize;

        for row in rows.iter().filter(|row| filter.matches(row)) {
            included += 1;
            let final_score = self.calculator.final_score(&row.record.components);
            let gymnast_id = row.record.key.gymnast_id;

            let index = *index_by_gymnast.entry(gymnast_id).or_insert_with(|| {
                entries.push(LeaderboardEntry {
                    rank: 0,
                    gymnast_id,
                    name: row.gymnast_name.clone(),
                    team: row.team.clone(),
                    category: row.category.clone(),
                    total_score: 0.0,
                    per_apparatus_score: BTreeMap::new(),
                });
                entries.len() - 1
            });

            let entry = &mut entries[index];
            entry.total_score += final_score;

            // one sheet per apparatus id, so a taken name means a second apparatus sharing it
            let label = if entry.per_apparatus_score.contains_key(&row.apparatus_name) {
                format!("{} #{}", row.apparatus_name, row.record.key.apparatus_id)
            } else {
                row.apparatus_name.clone()
            };
            entry.per_apparatus_score.insert(label, final_score);
        }

        entries.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
        for (position, entry) in entries.iter_mut().enumerate() {
            entry.rank = position + 1;
        }

        debug!(
            rows = rows.len(),
            included_rows = included,
            gymnasts = entries.len(),
            category = ?filter.category,
            apparatus = ?filter.apparatus,
            "Aggregated leaderboard"
        );

        entries
    }

    /// Flatten ranked entries into export rows
    pub fn summarize(entries: &[LeaderboardEntry]) -> Vec<SummaryRow> {
        entries.iter().map(SummaryRow::from).collect()
    }
}
