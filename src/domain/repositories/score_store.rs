//! Score Store Trait
//!
//! Persistence contract the scoring engine relies on. Implementations must
//! make `upsert` a single atomic insert-or-replace keyed by
//! (gymnast, event, apparatus): two concurrent submissions for one key leave
//! exactly one record, equal to one of the two payloads. Reads must return
//! whole records, never a mix of two writes.

use async_trait::async_trait;

use crate::domain::entities::roster::{Apparatus, EventScoreRow, GymnastProfile};
use crate::domain::entities::score::{ScoreKey, ScoreRecord, ScoreSubmission};
use crate::domain::errors::StoreError;

/// Common result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert the score sheet, or replace every field of the existing one for
    /// the same key (judge included). `created_at` survives a replace.
    async fn upsert(&self, submission: &ScoreSubmission) -> StoreResult<ScoreRecord>;

    async fn get(&self, key: &ScoreKey) -> StoreResult<Option<ScoreRecord>>;

    /// Every current record of an event joined with gymnast and apparatus
    /// metadata, ordered by gymnast id then apparatus id.
    async fn list_by_event(&self, event_id: i64) -> StoreResult<Vec<EventScoreRow>>;

    /// Distinct gymnast categories, sorted
    async fn list_categories(&self) -> StoreResult<Vec<String>>;

    /// Apparatus catalog, sorted by id
    async fn list_apparatus(&self) -> StoreResult<Vec<Apparatus>>;

    async fn is_judge_assigned(
        &self,
        judge_id: i64,
        event_id: i64,
        apparatus_id: i64,
    ) -> StoreResult<bool>;

    /// Create or update a gymnast (administration collaborator)
    async fn register_gymnast(&self, gymnast: &GymnastProfile) -> StoreResult<()>;

    /// Create or rename an apparatus (administration collaborator)
    async fn register_apparatus(&self, apparatus: &Apparatus) -> StoreResult<()>;

    /// Record that a judge may score an apparatus at an event. Idempotent.
    async fn assign_judge(&self, judge_id: i64, event_id: i64, apparatus_id: i64)
        -> StoreResult<()>;
}
