use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::{
    envelope::Envelope,
    error::Result,
    types::{
        CleanRequest, CleanResponseBody, CountResponseBody, DeleteCountResponseBody,
        MarkTaskRequest, MarkTaskResponseBody, SessionMessagesUploadRequest,
    },
    AppState,
};

/// `POST /session_messages/upload` — pair and persist one turn directly,
/// bypassing the dispatcher's cadence/queue path.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionMessagesUploadRequest>,
) -> Result<Envelope<Vec<String>>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| crate::error::DispatcherError::Validation("no usable session identity".to_string()))?;
    let now = chrono::Utc::now().to_rfc3339();
    let task_id = continuity_core::TaskId::new().to_string();
    let ids = state
        .window
        .upload(&session_id, &req.messages, &task_id, &now)?;
    Ok(Envelope::ok(ids))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<Vec<continuity_store::RoleMessage>>> {
    let messages = state.window.get(&session)?;
    Ok(Envelope::ok(messages))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<DeleteCountResponseBody>> {
    let deleted = state.window.delete(&session)?;
    Ok(Envelope::ok(DeleteCountResponseBody { deleted }))
}

pub async fn count(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<CountResponseBody>> {
    let count = state.window.count(&session)?;
    Ok(Envelope::ok(CountResponseBody { count }))
}

pub async fn mark_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkTaskRequest>,
) -> Result<Envelope<MarkTaskResponseBody>> {
    let claimed = state
        .window
        .mark_task(&req.session_id, req.task_index, &req.task_id)?;
    Ok(Envelope::ok(MarkTaskResponseBody { claimed }))
}

pub async fn clean(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CleanRequest>,
) -> Result<Envelope<CleanResponseBody>> {
    let deleted = state
        .window
        .clean(&req.session_id, state.config.retention.project_messages_count)?;
    Ok(Envelope::ok(CleanResponseBody { deleted }))
}
