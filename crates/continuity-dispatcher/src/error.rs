use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Aggregates every crate-local error type at the HTTP boundary, the way
/// `continuity_core::CoreError` aggregates transport-independent errors.
/// Each variant maps to a stable `.code()` string and an HTTP status, so
/// handlers never need their own error-mapping `match`.
#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("core error: {0}")]
    Core(#[from] continuity_core::CoreError),

    #[error("store error: {0}")]
    Store(#[from] continuity_store::StoreError),

    #[error("window error: {0}")]
    Window(#[from] continuity_window::WindowError),

    #[error("queue error: {0}")]
    Queue(#[from] continuity_queue::QueueError),

    #[error("compose error: {0}")]
    Compose(#[from] continuity_compose::ComposeError),

    #[error("llm provider error: {0}")]
    Llm(#[from] continuity_llm::ProviderError),

    #[error("profile worker error: {0}")]
    Profile(#[from] continuity_profile::ProfileError),

    #[error("topic worker error: {0}")]
    Topic(#[from] continuity_topics::TopicError),

    #[error("event worker error: {0}")]
    Event(#[from] continuity_events::EventError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl DispatcherError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatcherError::Core(e) => e.code(),
            DispatcherError::Store(_) => "DATABASE_ERROR",
            DispatcherError::Window(_) => "DATABASE_ERROR",
            DispatcherError::Queue(_) => "QUEUE_ERROR",
            DispatcherError::Compose(_) => "COMPOSE_ERROR",
            DispatcherError::Llm(_) => "LLM_PROVIDER_ERROR",
            DispatcherError::Profile(_) => "PROFILE_WORKER_ERROR",
            DispatcherError::Topic(_) => "TOPIC_WORKER_ERROR",
            DispatcherError::Event(_) => "EVENT_WORKER_ERROR",
            DispatcherError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            DispatcherError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatcherError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(error = %self, code = self.code(), "request failed");
        let body = Json(json!({
            "code": -1,
            "msg": self.to_string(),
            "data": { "error_code": self.code() },
        }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DispatcherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let e = DispatcherError::Validation("no usable session identity".to_string());
        assert_eq!(e.code(), "VALIDATION_ERROR");
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_map_to_internal_server_error() {
        let e = DispatcherError::Store(continuity_store::StoreError::Database(
            rusqlite::Error::QueryReturnedNoRows,
        ));
        assert_eq!(e.code(), "DATABASE_ERROR");
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
