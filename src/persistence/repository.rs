//! Database Repository
//!
//! SQLite implementation of `ScoreStore`.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};

use super::models::{ApparatusRow, EventScoreJoinRow, ScoreRow};
use super::DbPool;
use crate::domain::entities::roster::{Apparatus, EventScoreRow, GymnastProfile};
use crate::domain::entities::score::{ScoreKey, ScoreRecord, ScoreSubmission};
use crate::domain::errors::StoreError;
use crate::domain::repositories::{ScoreStore, StoreResult};

const SCORE_COLUMNS: &str = "gymnast_id, event_id, apparatus_id, judge_id, \
     d1, d2, d3, d4, a1, a2, a3, e1, e2, e3, technical_deduction, created_at, updated_at";

/// Score repository backed by a sqlx SQLite pool
#[derive(Clone)]
pub struct SqliteScoreStore {
    pool: DbPool,
}

impl SqliteScoreStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    async fn upsert(&self, submission: &ScoreSubmission) -> StoreResult<ScoreRecord> {
        let now = Utc::now();
        let key = submission.key;
        let c = &submission.components;

        // One statement: the UNIQUE key arbitrates concurrent writers
        let sql = format!(
            r#"
            INSERT INTO scores (
                gymnast_id, event_id, apparatus_id, judge_id,
                d1, d2, d3, d4, a1, a2, a3, e1, e2, e3,
                technical_deduction, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)
            ON CONFLICT (gymnast_id, event_id, apparatus_id) DO UPDATE SET
                judge_id = excluded.judge_id,
                d1 = excluded.d1,
                d2 = excluded.d2,
                d3 = excluded.d3,
                d4 = excluded.d4,
                a1 = excluded.a1,
                a2 = excluded.a2,
                a3 = excluded.a3,
                e1 = excluded.e1,
                e2 = excluded.e2,
                e3 = excluded.e3,
                technical_deduction = excluded.technical_deduction,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            SCORE_COLUMNS
        );

        let row = sqlx::query_as::<_, ScoreRow>(&sql)
            .bind(key.gymnast_id)
            .bind(key.event_id)
            .bind(key.apparatus_id)
            .bind(submission.judge_id)
            .bind(c.d1)
            .bind(c.d2)
            .bind(c.d3)
            .bind(c.d4)
            .bind(c.a1)
            .bind(c.a2)
            .bind(c.a3)
            .bind(c.e1)
            .bind(c.e2)
            .bind(c.e3)
            .bind(c.technical_deduction)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to upsert score for {}: {}", key, e);
                StoreError::from(e)
            })?;

        debug!(
            key = %key,
            judge_id = submission.judge_id,
            replaced = row.created_at != row.updated_at,
            "Upserted score"
        );
        Ok(row.into())
    }

    async fn get(&self, key: &ScoreKey) -> StoreResult<Option<ScoreRecord>> {
        let sql = format!(
            "SELECT {} FROM scores WHERE gymnast_id = ?1 AND event_id = ?2 AND apparatus_id = ?3",
            SCORE_COLUMNS
        );
        let row = sqlx::query_as::<_, ScoreRow>(&sql)
            .bind(key.gymnast_id)
            .bind(key.event_id)
            .bind(key.apparatus_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to get score for {}: {}", key, e);
                StoreError::from(e)
            })?;

        Ok(row.map(ScoreRecord::from))
    }

    async fn list_by_event(&self, event_id: i64) -> StoreResult<Vec<EventScoreRow>> {
        let rows = sqlx::query_as::<_, EventScoreJoinRow>(
            r#"
            SELECT s.gymnast_id, s.event_id, s.apparatus_id, s.judge_id,
                   s.d1, s.d2, s.d3, s.d4, s.a1, s.a2, s.a3, s.e1, s.e2, s.e3,
                   s.technical_deduction, s.created_at, s.updated_at,
                   g.name AS gymnast_name, g.category, g.team,
                   a.name AS apparatus_name
            FROM scores s
            JOIN gymnasts g ON g.id = s.gymnast_id
            JOIN apparatus a ON a.id = s.apparatus_id
            WHERE s.event_id = ?1
            ORDER BY s.gymnast_id, s.apparatus_id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list scores for event {}: {}", event_id, e);
            StoreError::from(e)
        })?;

        debug!(event_id = event_id, rows = rows.len(), "Listed event scores");
        Ok(rows.into_iter().map(EventScoreRow::from).collect())
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM gymnasts ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to list categories: {}", e);
                StoreError::from(e)
            })
    }

    async fn list_apparatus(&self) -> StoreResult<Vec<Apparatus>> {
        let rows = sqlx::query_as::<_, ApparatusRow>("SELECT id, name FROM apparatus ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to list apparatus: {}", e);
                StoreError::from(e)
            })?;

        Ok(rows.into_iter().map(Apparatus::from).collect())
    }

    async fn is_judge_assigned(
        &self,
        judge_id: i64,
        event_id: i64,
        apparatus_id: i64,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM judge_assignments
                WHERE judge_id = ?1 AND event_id = ?2 AND apparatus_id = ?3
            )
            "#,
        )
        .bind(judge_id)
        .bind(event_id)
        .bind(apparatus_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Failed to check assignment of judge {} (event {}, apparatus {}): {}",
                judge_id, event_id, apparatus_id, e
            );
            StoreError::from(e)
        })
    }

    async fn register_gymnast(&self, gymnast: &GymnastProfile) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO gymnasts (id, name, category, team)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                team = excluded.team
            "#,
        )
        .bind(gymnast.id)
        .bind(&gymnast.name)
        .bind(&gymnast.category)
        .bind(&gymnast.team)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to register gymnast {}: {}", gymnast.id, e);
            StoreError::from(e)
        })?;

        debug!("Registered gymnast: {} ({})", gymnast.id, gymnast.name);
        Ok(())
    }

    async fn register_apparatus(&self, apparatus: &Apparatus) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO apparatus (id, name)
            VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(apparatus.id)
        .bind(&apparatus.name)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to register apparatus {}: {}", apparatus.id, e);
            StoreError::from(e)
        })?;

        debug!("Registered apparatus: {} ({})", apparatus.id, apparatus.name);
        Ok(())
    }

    async fn assign_judge(
        &self,
        judge_id: i64,
        event_id: i64,
        apparatus_id: i64,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO judge_assignments (judge_id, event_id, apparatus_id)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(judge_id)
        .bind(event_id)
        .bind(apparatus_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to assign judge {}: {}", judge_id, e);
            StoreError::from(e)
        })?;

        Ok(())
    }
}
