use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};

use super::{error_response, store_error_status, AppState, ErrorResponse};
use crate::domain::entities::leaderboard::{FilterOptions, LeaderboardEntry, SummaryRow};
use crate::domain::services::scoring::LeaderboardFilter;

/// Query parameters for leaderboard endpoints
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    /// Gymnast category; empty means all categories
    pub category: Option<String>,
    /// Apparatus id; empty means all apparatus
    #[serde(default, deserialize_with = "blank_as_none")]
    pub apparatus: Option<i64>,
}

/// `?apparatus=` as sent by an "All" option; only non-numeric text is rejected
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid apparatus '{}': {}", value, e))),
    }
}

impl LeaderboardQuery {
    fn to_filter(&self) -> LeaderboardFilter {
        LeaderboardFilter {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            apparatus: self.apparatus,
        }
    }
}

/// API response for a leaderboard
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub event_id: i64,
    pub category: Option<String>,
    pub apparatus: Option<i64>,
    pub entries: Vec<LeaderboardEntry>,
}

/// API response for export rows
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub event_id: i64,
    pub rows: Vec<SummaryRow>,
}

/// Get ranked totals for an event
pub async fn get_leaderboard(
    State(service): State<AppState>,
    Path(event_id): Path<i64>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, (StatusCode, Json<ErrorResponse>)> {
    let filter = params.to_filter();
    let entries = service
        .leaderboard(event_id, &filter)
        .await
        .map_err(|e| error_response(store_error_status(&e), e))?;

    Ok(Json(LeaderboardResponse {
        event_id,
        category: filter.category,
        apparatus: filter.apparatus,
        entries,
    }))
}

/// Get flat export rows for an event
pub async fn get_summary(
    State(service): State<AppState>,
    Path(event_id): Path<i64>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let rows = service
        .summary(event_id, &params.to_filter())
        .await
        .map_err(|e| error_response(store_error_status(&e), e))?;

    Ok(Json(SummaryResponse { event_id, rows }))
}

/// Get the categories and apparatus available for filtering
pub async fn get_filter_options(
    State(service): State<AppState>,
) -> Result<Json<FilterOptions>, (StatusCode, Json<ErrorResponse>)> {
    service
        .filter_options()
        .await
        .map(Json)
        .map_err(|e| error_response(store_error_status(&e), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::identity::RequestIdentity;
    use crate::application::services::ScoringService;
    use crate::domain::entities::roster::{Apparatus, GymnastProfile};
    use crate::domain::entities::score::ScoreInput;
    use crate::domain::repositories::ScoreStore;
    use crate::persistence::memory::InMemoryScoreStore;
    use std::sync::Arc;

    async fn state() -> AppState {
        let store = InMemoryScoreStore::new();
        for (id, name, category) in [(1, "Ana", "Senior"), (2, "Bea", "Junior")] {
            store
                .register_gymnast(&GymnastProfile {
                    id,
                    name: name.to_string(),
                    category: category.to_string(),
                    team: None,
                })
                .await
                .unwrap();
        }
        store
            .register_apparatus(&Apparatus {
                id: 1,
                name: "Floor".to_string(),
            })
            .await
            .unwrap();

        let service = ScoringService::new(Arc::new(store));
        for (gymnast_id, d1) in [(1, 5.0), (2, 6.0)] {
            service
                .submit(
                    &RequestIdentity::administrator(1),
                    ScoreInput {
                        gymnast_id,
                        event_id: 3,
                        apparatus_id: 1,
                        d1,
                        d2: 0.0,
                        d3: 0.0,
                        d4: 0.0,
                        a1: 9.0,
                        a2: 0.0,
                        a3: 0.0,
                        e1: 9.0,
                        e2: 0.0,
                        e3: 0.0,
                        technical_deduction: 0.0,
                    },
                )
                .await
                .unwrap();
        }
        Arc::new(service)
    }

    fn parse_query(uri: &str) -> Option<LeaderboardQuery> {
        let uri: axum::http::Uri = uri.parse().unwrap();
        Query::<LeaderboardQuery>::try_from_uri(&uri)
            .ok()
            .map(|Query(query)| query)
    }

    #[test]
    fn test_blank_apparatus_means_all() {
        let query = parse_query("/events/1/leaderboard?category=&apparatus=").unwrap();
        assert_eq!(query.apparatus, None);
        assert!(query.to_filter().is_unrestricted());

        let query = parse_query("/events/1/leaderboard").unwrap();
        assert_eq!(query.apparatus, None);
    }

    #[test]
    fn test_apparatus_query_parsing() {
        let query = parse_query("/events/1/leaderboard?apparatus=2&category=Junior").unwrap();
        assert_eq!(query.apparatus, Some(2));
        assert_eq!(query.category.as_deref(), Some("Junior"));

        assert!(parse_query("/events/1/leaderboard?apparatus=vault").is_none());
    }

    #[test]
    fn test_blank_category_means_all() {
        let query = LeaderboardQuery {
            category: Some("  ".to_string()),
            apparatus: None,
        };
        assert!(query.to_filter().is_unrestricted());
    }

    #[tokio::test]
    async fn test_get_leaderboard() {
        let response = get_leaderboard(
            State(state().await),
            Path(3),
            Query(LeaderboardQuery::default()),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(response.event_id, 3);
        assert_eq!(response.entries.len(), 2);
        assert_eq!(response.entries[0].name, "Bea");
        assert!((response.entries[0].total_score - 8.0).abs() < 1e-9);
        assert_eq!(response.entries[1].name, "Ana");
    }

    #[tokio::test]
    async fn test_get_leaderboard_by_category() {
        let response = get_leaderboard(
            State(state().await),
            Path(3),
            Query(LeaderboardQuery {
                category: Some("Senior".to_string()),
                apparatus: None,
            }),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(response.category.as_deref(), Some("Senior"));
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].name, "Ana");
        assert_eq!(response.entries[0].rank, 1);
    }

    #[tokio::test]
    async fn test_get_leaderboard_unknown_event_is_empty() {
        let response = get_leaderboard(
            State(state().await),
            Path(99),
            Query(LeaderboardQuery::default()),
        )
        .await
        .unwrap()
        .0;
        assert!(response.entries.is_empty());
    }

    #[tokio::test]
    async fn test_get_summary() {
        let response = get_summary(
            State(state().await),
            Path(3),
            Query(LeaderboardQuery::default()),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.rows[0].rank, 1);
        assert_eq!(response.rows[0].apparatus_count, 1);
    }

    #[tokio::test]
    async fn test_get_filter_options() {
        let options = get_filter_options(State(state().await)).await.unwrap().0;
        assert_eq!(options.categories, vec!["Junior", "Senior"]);
        assert_eq!(options.apparatus[0].name, "Floor");
    }
}
