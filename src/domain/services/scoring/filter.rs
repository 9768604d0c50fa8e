use serde::{Deserialize, Serialize};

use crate::domain::entities::roster::EventScoreRow;

/// Leaderboard restriction. Both criteria must hold; `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardFilter {
    /// Exact gymnast category
    pub category: Option<String>,
    /// Exact apparatus id
    pub apparatus: Option<i64>,
}

impl LeaderboardFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_apparatus(mut self, apparatus_id: i64) -> Self {
        self.apparatus = Some(apparatus_id);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.category.is_none() && self.apparatus.is_none()
    }

    pub fn matches(&self, row: &EventScoreRow) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| row.category == category);
        let apparatus_ok = self
            .apparatus
            .map_or(true, |apparatus_id| row.record.key.apparatus_id == apparatus_id);

        category_ok && apparatus_ok
    }
}
