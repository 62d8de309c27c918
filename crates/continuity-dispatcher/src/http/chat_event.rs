use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::{
    envelope::Envelope,
    error::Result,
    types::{DeleteCountResponseBody, EventUploadRequest},
    AppState,
};

/// `POST /chat_event/upload` — run the key-event extraction worker directly
/// for one batch of turns, bypassing the dispatcher's cadence/queue path.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EventUploadRequest>,
) -> Result<Envelope<()>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| crate::error::DispatcherError::Validation("no usable session identity".to_string()))?;
    state.event_worker.process(&session_id, &req.turns).await?;
    Ok(Envelope::ok(()))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<continuity_store::SessionEvents>> {
    let events = state.store.get_session_events(&session)?;
    Ok(Envelope::ok(events))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<DeleteCountResponseBody>> {
    let deleted = state.store.delete_events(&session)?;
    Ok(Envelope::ok(DeleteCountResponseBody { deleted }))
}
