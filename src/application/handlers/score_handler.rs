use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{error_response, store_error_status, AppState, ErrorResponse};
use crate::application::identity::RequestIdentity;
use crate::application::services::SubmissionReceipt;
use crate::domain::entities::score::ScoreInput;
use crate::domain::errors::SubmissionError;

/// Score sheet body; omitted marks are sent as the 0 sentinel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSheetRequest {
    pub gymnast_id: i64,
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

impl ScoreSheetRequest {
    fn into_input(self, event_id: i64) -> ScoreInput {
        ScoreInput {
            gymnast_id: self.gymnast_id,
            event_id,
            apparatus_id: self.apparatus_id,
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
        }
    }
}

/// Accepted submission as shown to the judge
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub gymnast_id: i64,
    pub event_id: i64,
    pub apparatus_id: i64,
    pub judge_id: i64,
    pub total_d: f64,
    pub middle_a: f64,
    pub middle_e: f64,
    pub raw_total: f64,
    pub final_score: f64,
    pub updated_at: String,
}

impl From<SubmissionReceipt> for SubmissionResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        let key = receipt.record.key;
        SubmissionResponse {
            gymnast_id: key.gymnast_id,
            event_id: key.event_id,
            apparatus_id: key.apparatus_id,
            judge_id: receipt.record.judge_id,
            total_d: receipt.breakdown.total_d,
            middle_a: receipt.breakdown.middle_a,
            middle_e: receipt.breakdown.middle_e,
            raw_total: receipt.breakdown.raw_total,
            final_score: receipt.breakdown.final_score,
            updated_at: receipt.record.updated_at.to_rfc3339(),
        }
    }
}

fn submission_error_status(error: &SubmissionError) -> StatusCode {
    match error {
        SubmissionError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        SubmissionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SubmissionError::NotSaved(e) => store_error_status(e),
    }
}

/// Submit or overwrite a score sheet for an event
pub async fn submit_score(
    State(service): State<AppState>,
    identity: RequestIdentity,
    Path(event_id): Path<i64>,
    payload: Result<Json<ScoreSheetRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(event_id = event_id, error = %rejection, "Malformed score sheet");
        // oversized bodies and wrong content types keep their own status
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            other => other,
        };
        error_response(status, rejection.body_text())
    })?;

    match service.submit(&identity, request.into_input(event_id)).await {
        Ok(receipt) => Ok(Json(receipt.into())),
        Err(e) => Err(error_response(submission_error_status(&e), e)),
    }
}
