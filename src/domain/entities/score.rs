//! Score sheet entities - raw judge components and the stored record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Nominal upper bound for each difficulty component
pub const MAX_DIFFICULTY: f64 = 20.0;
/// Nominal upper bound for artistry, execution and deduction values
pub const MAX_EXECUTION: f64 = 10.0;

/// Identity of a score sheet. At most one record exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScoreKey {
    pub gymnast_id: i64,
    pub event_id: i64,
    pub apparatus_id: i64,
}

impl ScoreKey {
    pub fn new(gymnast_id: i64, event_id: i64, apparatus_id: i64) -> Self {
        ScoreKey {
            gymnast_id,
            event_id,
            apparatus_id,
        }
    }
}

impl std::fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gymnast={} event={} apparatus={}",
            self.gymnast_id, self.event_id, self.apparatus_id
        )
    }
}

/// The ten judge components plus the technical deduction.
///
/// A value of `0.0` means "not provided" to the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
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
}

impl ScoreComponents {
    pub fn difficulty(&self) -> [f64; 4] {
        [self.d1, self.d2, self.d3, self.d4]
    }

    pub fn artistry(&self) -> [f64; 3] {
        [self.a1, self.a2, self.a3]
    }

    pub fn execution(&self) -> [f64; 3] {
        [self.e1, self.e2, self.e3]
    }
}

/// Score sheet as submitted by a judge, before boundary validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInput {
    pub gymnast_id: i64,
    pub event_id: i64,
    pub apparatus_id: i64,
    #[serde(default)]
    pub d1: f64,
    #[serde(default)]
    pub d2: f64,
    #[serde(default)]
    pub d3: f64,
    #[serde(default)]
    pub d4: f64,
    #[serde(default)]
    pub a1: f64,
    #[serde(default)]
    pub a2: f64,
    #[serde(default)]
    pub a3: f64,
    #[serde(default)]
    pub e1: f64,
    #[serde(default)]
    pub e2: f64,
    #[serde(default)]
    pub e3: f64,
    #[serde(default)]
    pub technical_deduction: f64,
}

impl ScoreInput {
    pub fn key(&self) -> ScoreKey {
        ScoreKey::new(self.gymnast_id, self.event_id, self.apparatus_id)
    }

    /// Check every component against its nominal range.
    ///
    /// Omitted fields deserialize to `0.0`, the "not provided" sentinel.
    pub fn validate(&self) -> Result<ScoreComponents, ValidationError> {
        let difficulty = [
            ("d1", self.d1),
            ("d2", self.d2),
            ("d3", self.d3),
            ("d4", self.d4),
        ];
        for (component, value) in difficulty {
            check_range(component, value, MAX_DIFFICULTY)?;
        }

        let judged = [
            ("a1", self.a1),
            ("a2", self.a2),
            ("a3", self.a3),
            ("e1", self.e1),
            ("e2", self.e2),
            ("e3", self.e3),
            ("technical_deduction", self.technical_deduction),
        ];
        for (component, value) in judged {
            check_range(component, value, MAX_EXECUTION)?;
        }

        Ok(ScoreComponents {
            d1: self.d1,
            d2: self.d2,
            d3: self.d3,
            d4: self.d4,
            a1: self.a1,
            a2: self.a2,
            a3: self.a3,
            e1: self.e1,
            e2: self.e2,
            e3: self.e3,
            technical_deduction: self.technical_deduction,
        })
    }
}

fn check_range(component: &'static str, value: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { component });
    }
    if !(0.0..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            component,
            value,
            min: 0.0,
            max,
        });
    }
    Ok(())
}

/// Validated write request handed to a `ScoreStore`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub key: ScoreKey,
    pub judge_id: i64,
    pub components: ScoreComponents,
}

/// Current score sheet for a key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub key: ScoreKey,
    /// Last judge to submit for this key
    pub judge_id: i64,
    pub components: ScoreComponents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
