use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::identity::RequestIdentity;
use crate::domain::entities::leaderboard::{FilterOptions, LeaderboardEntry, SummaryRow};
use crate::domain::entities::score::{ScoreInput, ScoreKey, ScoreRecord, ScoreSubmission};
use crate::domain::errors::{StoreError, SubmissionError};
use crate::domain::repositories::ScoreStore;
use crate::domain::services::leaderboard_cache::{CacheLookup, CacheStats, LeaderboardCache};
use crate::domain::services::scoring::{
    LeaderboardAggregator, LeaderboardFilter, ScoreBreakdown, ScoreCalculator,
};

/// Result of an accepted submission, for immediate feedback at entry time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub record: ScoreRecord,
    pub breakdown: ScoreBreakdown,
}

impl SubmissionReceipt {
    pub fn final_score(&self) -> f64 {
        self.breakdown.final_score
    }
}

/// Entry point for judge submissions and leaderboard reads.
///
/// Holds no per-request state; the identity of the caller is passed to each
/// call.
pub struct ScoringService {
    store: Arc<dyn ScoreStore>,
    calculator: ScoreCalculator,
    aggregator: LeaderboardAggregator,
    cache: Option<LeaderboardCache>,
}

impl ScoringService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        ScoringService {
            store,
            calculator: ScoreCalculator::new(),
            aggregator: LeaderboardAggregator::new(),
            cache: None,
        }
    }

    pub fn with_cache(mut self) -> Self {
        self.cache = Some(LeaderboardCache::new());
        self
    }

    /// Enable the leaderboard cache, keeping at most `capacity` boards
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Some(LeaderboardCache::with_capacity(capacity));
        self
    }

    pub fn store(&self) -> &Arc<dyn ScoreStore> {
        &self.store
    }

    /// Validate, authorize and store one score sheet.
    ///
    /// Overwrites any existing sheet for the same (gymnast, event, apparatus)
    /// and makes the caller its judge.
    pub async fn submit(
        &self,
        identity: &RequestIdentity,
        input: ScoreInput,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let key = input.key();
        let unauthorized = || SubmissionError::Unauthorized {
            user_id: identity.user_id,
            event_id: key.event_id,
            apparatus_id: key.apparatus_id,
        };

        if !identity.role.can_submit_scores() {
            warn!(
                user_id = identity.user_id,
                role = %identity.role,
                key = %key,
                "Score submission rejected for role"
            );
            return Err(unauthorized());
        }

        let components = input.validate().map_err(|e| {
            debug!(key = %key, error = %e, "Score input rejected");
            e
        })?;

        if identity.role.requires_assignment() {
            let assigned = self
                .store
                .is_judge_assigned(identity.user_id, key.event_id, key.apparatus_id)
                .await?;
            if !assigned {
                warn!(
                    user_id = identity.user_id,
                    key = %key,
                    "Judge is not assigned to this apparatus"
                );
                return Err(unauthorized());
            }
        }

        let submission = ScoreSubmission {
            key,
            judge_id: identity.user_id,
            components,
        };
        let record = self.store.upsert(&submission).await.map_err(|e| {
            warn!(key = %key, error = %e, "Score not saved");
            e
        })?;

        if let Some(cache) = &self.cache {
            cache.invalidate_event(key.event_id).await;
        }

        let breakdown = self.calculator.breakdown(&record.components);
        info!(
            key = %key,
            judge_id = record.judge_id,
            final_score = breakdown.final_score,
            "Score saved"
        );

        Ok(SubmissionReceipt { record, breakdown })
    }

    /// Ranked totals for an event under `filter`
    pub async fn leaderboard(
        &self,
        event_id: i64,
        filter: &LeaderboardFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let generation = match &self.cache {
            Some(cache) => match cache.lookup(event_id, filter).await {
                CacheLookup::Hit(board) => return Ok(board),
                CacheLookup::Miss { generation } => Some(generation),
            },
            None => None,
        };

        let rows = self.store.list_by_event(event_id).await?;
        let board = self.aggregator.aggregate(&rows, filter);

        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            cache
                .store(event_id, filter, generation, board.clone())
                .await;
        }

        Ok(board)
    }

    /// Export rows for tabular consumers
    pub async fn summary(
        &self,
        event_id: i64,
        filter: &LeaderboardFilter,
    ) -> Result<Vec<SummaryRow>, StoreError> {
        let board = self.leaderboard(event_id, filter).await?;
        Ok(LeaderboardAggregator::summarize(&board))
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, StoreError> {
        Ok(FilterOptions {
            categories: self.store.list_categories().await?,
            apparatus: self.store.list_apparatus().await?,
        })
    }

    /// Recompute the final score of a stored sheet from its raw fields
    pub async fn final_score_for(&self, key: &ScoreKey) -> Result<Option<f64>, StoreError> {
        let record = self.store.get(key).await?;
        Ok(record.map(|r| self.calculator.final_score(&r.components)))
    }

    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            Some(cache) => Some(cache.get_cache_stats().await),
            None => None,
        }
    }
}
