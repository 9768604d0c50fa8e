//! Request-scoped caller identity
//!
//! Session handling lives in an upstream authentication gateway, which
//! forwards the authenticated user as `x-user-id` / `x-user-role` headers.
//! Handlers receive the identity explicitly; nothing is stored globally.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::application::handlers::ErrorResponse;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May score apparatus they are assigned to
    Judge,
    /// May score any apparatus
    Administrator,
    /// Read-only access
    Viewer,
}

impl Role {
    pub fn can_submit_scores(&self) -> bool {
        matches!(self, Role::Judge | Role::Administrator)
    }

    pub fn requires_assignment(&self) -> bool {
        matches!(self, Role::Judge)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "judge" => Ok(Role::Judge),
            "admin" | "administrator" => Ok(Role::Administrator),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Judge => write!(f, "judge"),
            Role::Administrator => write!(f, "administrator"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// Authenticated caller of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIdentity {
    pub user_id: i64,
    pub role: Role,
}

impl RequestIdentity {
    pub fn judge(user_id: i64) -> Self {
        Self {
            user_id,
            role: Role::Judge,
        }
    }

    pub fn administrator(user_id: i64) -> Self {
        Self {
            user_id,
            role: Role::Administrator,
        }
    }

    pub fn viewer(user_id: i64) -> Self {
        Self {
            user_id,
            role: Role::Viewer,
        }
    }
}

fn unauthorized(message: String) -> (StatusCode, Json<ErrorResponse>) {
    tracing::warn!("{}", message);
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse { error: message }),
    )
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| unauthorized(format!("Missing {} header", USER_ID_HEADER)))?
            .trim()
            .parse::<i64>()
            .map_err(|e| unauthorized(format!("Invalid {} header: {}", USER_ID_HEADER, e)))?;

        let role = header(USER_ROLE_HEADER)
            .ok_or_else(|| unauthorized(format!("Missing {} header", USER_ROLE_HEADER)))?
            .parse::<Role>()
            .map_err(unauthorized)?;

        Ok(RequestIdentity { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<RequestIdentity, StatusCode> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        RequestIdentity::from_request_parts(&mut parts, &())
            .await
            .map_err(|(status, _)| status)
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("judge".parse::<Role>().unwrap(), Role::Judge);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!(" viewer ".parse::<Role>().unwrap(), Role::Viewer);
        assert!("coach".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Judge.can_submit_scores());
        assert!(Role::Judge.requires_assignment());
        assert!(Role::Administrator.can_submit_scores());
        assert!(!Role::Administrator.requires_assignment());
        assert!(!Role::Viewer.can_submit_scores());
    }

    #[tokio::test]
    async fn test_extracts_identity_from_headers() {
        let identity = extract(&[(USER_ID_HEADER, "42"), (USER_ROLE_HEADER, "judge")])
            .await
            .unwrap();
        assert_eq!(identity, RequestIdentity::judge(42));
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        assert_eq!(
            extract(&[(USER_ROLE_HEADER, "judge")]).await.unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            extract(&[(USER_ID_HEADER, "42")]).await.unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_malformed_headers_rejected() {
        assert_eq!(
            extract(&[(USER_ID_HEADER, "abc"), (USER_ROLE_HEADER, "judge")])
                .await
                .unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            extract(&[(USER_ID_HEADER, "1"), (USER_ROLE_HEADER, "coach")])
                .await
                .unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
    }
}
