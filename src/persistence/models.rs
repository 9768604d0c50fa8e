//! Database Models
//!
//! Row shapes read back from SQLite and their conversion into domain entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::roster::{Apparatus, EventScoreRow};
use crate::domain::entities::score::{ScoreComponents, ScoreKey, ScoreRecord};

/// Score sheet row in database
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub gymnast_id: i64,
    pub event_id: i64,
    pub apparatus_id: i64,
    pub judge_id: i64,
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub e1: f64,
    pub e2: f64,
    pub e3: f64,
    pub technical_deduction: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScoreRow> for ScoreRecord {
    fn from(row: ScoreRow) -> Self {
        ScoreRecord {
            key: ScoreKey::new(row.gymnast_id, row.event_id, row.apparatus_id),
            judge_id: row.judge_id,
            components: ScoreComponents {
                d1: row.d1,
                d2: row.d2,
                d3: row.d3,
                d4: row.d4,
                a1: row.a1,
                a2: row.a2,
                a3: row.a3,
                e1: row.e1,
                e2: row.e2,
                e3: row.e3,
                technical_deduction: row.technical_deduction,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Score row joined with gymnast and apparatus columns
#[derive(Debug, Clone, FromRow)]
pub struct EventScoreJoinRow {
    #[sqlx(flatten)]
    pub score: ScoreRow,
    pub gymnast_name: String,
    pub category: String,
    pub team: Option<String>,
    pub apparatus_name: String,
}

impl From<EventScoreJoinRow> for EventScoreRow {
    fn from(row: EventScoreJoinRow) -> Self {
        EventScoreRow {
            record: row.score.into(),
            gymnast_name: row.gymnast_name,
            category: row.category,
            team: row.team,
            apparatus_name: row.apparatus_name,
        }
    }
}

/// Apparatus catalog row
#[derive(Debug, Clone, FromRow)]
pub struct ApparatusRow {
    pub id: i64,
    pub name: String,
}

impl From<ApparatusRow> for Apparatus {
    fn from(row: ApparatusRow) -> Self {
        Apparatus {
            id: row.id,
            name: row.name,
        }
    }
}
