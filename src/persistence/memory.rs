//! In-memory `ScoreStore`
//!
//! All state sits behind one tokio `RwLock`; an upsert holds the write lock
//! for its lookup and write, so it is atomic per key, and readers clone whole
//! records under the read lock.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::roster::{Apparatus, EventScoreRow, GymnastProfile};
use crate::domain::entities::score::{ScoreKey, ScoreRecord, ScoreSubmission};
use crate::domain::errors::StoreError;
use crate::domain::repositories::{ScoreStore, StoreResult};

#[derive(Default)]
struct MemoryState {
    // ordered so event listings come out by gymnast id then apparatus id
    scores: BTreeMap<ScoreKey, ScoreRecord>,
    gymnasts: HashMap<i64, GymnastProfile>,
    apparatus: BTreeMap<i64, Apparatus>,
    assignments: HashSet<(i64, i64, i64)>,
}

#[derive(Default)]
pub struct InMemoryScoreStore {
    state: RwLock<MemoryState>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn score_count(&self) -> usize {
        self.state.read().await.scores.len()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn upsert(&self, submission: &ScoreSubmission) -> StoreResult<ScoreRecord> {
        let key = submission.key;
        let mut state = self.state.write().await;

        if !state.gymnasts.contains_key(&key.gymnast_id) {
            return Err(StoreError::Constraint(format!(
                "unknown gymnast {}",
                key.gymnast_id
            )));
        }
        if !state.apparatus.contains_key(&key.apparatus_id) {
            return Err(StoreError::Constraint(format!(
                "unknown apparatus {}",
                key.apparatus_id
            )));
        }

        let now = Utc::now();
        let created_at = state
            .scores
            .get(&key)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let record = ScoreRecord {
            key,
            judge_id: submission.judge_id,
            components: submission.components,
            created_at,
            updated_at: now,
        };
        let replaced = state.scores.insert(key, record.clone()).is_some();

        debug!(
            key = %key,
            judge_id = submission.judge_id,
            replaced = replaced,
            "Upserted score"
        );
        Ok(record)
    }

    async fn get(&self, key: &ScoreKey) -> StoreResult<Option<ScoreRecord>> {
        Ok(self.state.read().await.scores.get(key).cloned())
    }

    async fn list_by_event(&self, event_id: i64) -> StoreResult<Vec<EventScoreRow>> {
        let state = self.state.read().await;

        let rows: Vec<EventScoreRow> = state
            .scores
            .values()
            .filter(|record| record.key.event_id == event_id)
            .filter_map(|record| {
                let gymnast = state.gymnasts.get(&record.key.gymnast_id)?;
                let apparatus = state.apparatus.get(&record.key.apparatus_id)?;
                Some(EventScoreRow {
                    record: record.clone(),
                    gymnast_name: gymnast.name.clone(),
                    category: gymnast.category.clone(),
                    team: gymnast.team.clone(),
                    apparatus_name: apparatus.name.clone(),
                })
            })
            .collect();

        debug!(event_id = event_id, rows = rows.len(), "Listed event scores");
        Ok(rows)
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        let categories: BTreeSet<String> = state
            .gymnasts
            .values()
            .map(|g| g.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn list_apparatus(&self) -> StoreResult<Vec<Apparatus>> {
        Ok(self.state.read().await.apparatus.values().cloned().collect())
    }

    async fn is_judge_assigned(
        &self,
        judge_id: i64,
        event_id: i64,
        apparatus_id: i64,
    ) -> StoreResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .contains(&(judge_id, event_id, apparatus_id)))
    }

    async fn register_gymnast(&self, gymnast: &GymnastProfile) -> StoreResult<()> {
        self.state
            .write()
            .await
            .gymnasts
            .insert(gymnast.id, gymnast.clone());
        Ok(())
    }

    async fn register_apparatus(&self, apparatus: &Apparatus) -> StoreResult<()> {
        self.state
            .write()
            .await
            .apparatus
            .insert(apparatus.id, apparatus.clone());
        Ok(())
    }

    async fn assign_judge(
        &self,
        judge_id: i64,
        event_id: i64,
        apparatus_id: i64,
    ) -> StoreResult<()> {
        self.state
            .write()
            .await
            .assignments
            .insert((judge_id, event_id, apparatus_id));
        Ok(())
    }
}
