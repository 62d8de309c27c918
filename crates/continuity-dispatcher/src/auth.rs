use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;

/// Requires every request to carry `Authorization: Bearer <auth_token>`
/// matching `state.config.dispatcher.auth_token`.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if check_auth(&state, request.headers()) {
        return next.run(request).await;
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "code": -1,
            "msg": "missing or invalid bearer token",
            "data": { "error_code": "UNAUTHORIZED" },
        })),
    )
        .into_response()
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> bool {
    extract_bearer(headers)
        .map(|t| t == state.config.dispatcher.auth_token)
        .unwrap_or(false)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extract_bearer_strips_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret-token"));
        assert_eq!(extract_bearer(&headers), Some("secret-token"));
    }

    #[test]
    fn extract_bearer_rejects_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn extract_bearer_rejects_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer(&headers), None);
    }
}
