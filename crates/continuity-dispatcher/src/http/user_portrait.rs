use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::{
    envelope::Envelope, error::Result, types::ProfileUploadRequest, types::DeleteCountResponseBody,
    AppState,
};

/// `POST /user_portrait/upload` — run the profile merge worker directly for
/// one batch of user text, bypassing the dispatcher's cadence/queue path.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileUploadRequest>,
) -> Result<Envelope<()>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| crate::error::DispatcherError::Validation("no usable session identity".to_string()))?;
    state
        .profile_worker
        .process(&session_id, &req.user_texts)
        .await?;
    Ok(Envelope::ok(()))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<continuity_core::Node>> {
    let portrait = state.store.get_portrait_or_empty(&session)?;
    Ok(Envelope::ok(portrait))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<DeleteCountResponseBody>> {
    let deleted = state.store.delete_portrait(&session)?;
    Ok(Envelope::ok(DeleteCountResponseBody { deleted }))
}
