use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::{
    envelope::Envelope,
    error::Result,
    types::{DeleteCountResponseBody, SearchQuery, TopicUploadRequest},
    AppState,
};

/// `POST /topic_summary/upload` — run the topic extraction worker directly
/// for one batch of turns, bypassing the dispatcher's cadence/queue path.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TopicUploadRequest>,
) -> Result<Envelope<()>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| crate::error::DispatcherError::Validation("no usable session identity".to_string()))?;
    state.topic_worker.process(&session_id, &req.turns).await?;
    Ok(Envelope::ok(()))
}

/// `GET /topic_summary/get/{session}` — the active-topic shortlist plus the
/// records reachable from it (phase A of retrieval, no lexical query).
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<continuity_topics::TopicSearchResult>> {
    let result = state.retriever.search(&session, "")?;
    Ok(Envelope::ok(result))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<DeleteCountResponseBody>> {
    let deleted = state.store.delete_topics(&session)?;
    Ok(Envelope::ok(DeleteCountResponseBody { deleted }))
}

pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Envelope<continuity_store::TopicIndexDoc>> {
    let info = state.store.get_topic_info(&session)?;
    Ok(Envelope::ok(info))
}

/// `GET /topic_summary/search/{session}?q=...` — full two-phase retrieval:
/// the active shortlist plus an FTS5 lexical search of inactive topics.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Envelope<continuity_topics::TopicSearchResult>> {
    let result = state.retriever.search(&session, q.q.as_deref().unwrap_or(""))?;
    Ok(Envelope::ok(result))
}
