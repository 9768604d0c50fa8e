use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boundary validation failures for a submitted score sheet.
///
/// The calculator itself never rejects input; these checks run once when a
/// `ScoreInput` is turned into `ScoreComponents`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{component} must be a finite number")]
    NotFinite { component: &'static str },

    #[error("{component} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        component: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Failures raised by a `ScoreStore` implementation.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StoreError {
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Transient failures a caller may retry unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let message = e.to_string();
        match &e {
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                StoreError::Constraint(message)
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => StoreError::Unavailable(message),
            _ => StoreError::Query(message),
        }
    }
}

/// Why a judge submission did not produce a stored score.
///
/// The three classes are kept apart so callers can reject, re-authenticate or
/// retry respectively.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("User {user_id} is not allowed to score apparatus {apparatus_id} at event {event_id}")]
    Unauthorized {
        user_id: i64,
        event_id: i64,
        apparatus_id: i64,
    },

    #[error("Invalid score input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Score not saved: {0}")]
    NotSaved(#[from] StoreError),
}

impl SubmissionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmissionError::NotSaved(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::OutOfRange {
            component: "e2",
            value: 11.0,
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(err.to_string(), "e2 = 11 is outside [0, 10]");
    }

    #[test]
    fn test_submission_error_from_validation() {
        let err: SubmissionError = ValidationError::NotFinite { component: "d1" }.into();
        assert!(matches!(err, SubmissionError::InvalidInput(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_only_unavailable_store_errors_are_retryable() {
        let unavailable: SubmissionError = StoreError::Unavailable("pool timed out".into()).into();
        let constraint: SubmissionError = StoreError::Constraint("unique".into()).into();
        assert!(unavailable.is_retryable());
        assert!(!constraint.is_retryable());

        let unauthorized = SubmissionError::Unauthorized {
            user_id: 7,
            event_id: 1,
            apparatus_id: 2,
        };
        assert!(!unauthorized.is_retryable());
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_transient());
    }

    #[test]
    fn test_row_not_found_maps_to_query() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Query(_)));
    }
}
