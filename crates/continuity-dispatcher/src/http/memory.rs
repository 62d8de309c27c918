use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use continuity_compose::ApplyResult;
use continuity_queue::QueueMessage;

use crate::{
    envelope::Envelope,
    error::{DispatcherError, Result},
    types::{
        ApplyRequest, DeleteRequest, DeleteResponseBody, DeleteResultEntry, DispatchJobPayload,
        MessagesRequest, MessagesResponseBody, QueryRequest, QueryResponseBody, TaskIdResponse,
        UploadRequest,
    },
    AppState,
};

/// `POST /memory/upload` — enqueue one turn onto the ingest queue. Returns
/// immediately; the dispatcher-worker pool does the persisting/fan-out.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> Result<Envelope<TaskIdResponse>> {
    let session_ref = crate::types::SessionRef {
        session_id: req.session_id,
        user_id: req.user_id,
        role_id: req.role_id,
        group_id: req.group_id,
    };
    let session_id = session_ref
        .resolve()
        .ok_or_else(|| DispatcherError::Validation("no usable session identity".to_string()))?;

    let payload = serde_json::to_value(DispatchJobPayload {
        session_id: session_id.clone(),
        messages: req.messages,
    })
    .map_err(continuity_queue::QueueError::from)?;
    let msg = QueueMessage::new(session_id, payload);
    let task_id = msg.task_id.clone();
    state.ingest_queue.enqueue(&msg)?;

    Ok(Envelope::ok(TaskIdResponse { task_id }))
}

/// `POST /memory/query` — aggregated, unrendered view of the four artifacts.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Envelope<QueryResponseBody>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| DispatcherError::Validation("no usable session identity".to_string()))?;
    let result = state
        .compose
        .query(&session_id, req.query.as_deref())
        .await?;
    Ok(Envelope::ok(result.into()))
}

/// `POST /memory/apply` — same fan-out as query, rendered into a system
/// prompt plus the raw message window.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApplyRequest>,
) -> Result<Envelope<ApplyResult>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| DispatcherError::Validation("no usable session identity".to_string()))?;
    let result: ApplyResult = state
        .compose
        .apply(&session_id, &req.role_prompt, req.query.as_deref())
        .await?;
    Ok(Envelope::ok(result))
}

/// `POST /memory/messages` — bounded recent window, role-tagged.
pub async fn messages(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessagesRequest>,
) -> Result<Envelope<MessagesResponseBody>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| DispatcherError::Validation("no usable session identity".to_string()))?;
    let messages = state.window.get(&session_id)?;
    Ok(Envelope::ok(MessagesResponseBody { messages }))
}

/// `DELETE /memory/delete` — cascades across all four artifact tables and
/// every pending queue entry, concurrently, reporting per-service results
/// rather than failing the whole request on one service's error.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<Envelope<DeleteResponseBody>> {
    let session_id = req.session_id;

    let messages_store = state.store.clone();
    let messages_session = session_id.clone();
    let messages_task = tokio::task::spawn_blocking(move || {
        messages_store.delete_messages(&messages_session)
    });

    let portrait_store = state.store.clone();
    let portrait_session = session_id.clone();
    let portrait_task =
        tokio::task::spawn_blocking(move || portrait_store.delete_portrait(&portrait_session));

    let topics_store = state.store.clone();
    let topics_session = session_id.clone();
    let topics_task =
        tokio::task::spawn_blocking(move || topics_store.delete_topics(&topics_session));

    let events_store = state.store.clone();
    let events_session = session_id.clone();
    let events_task =
        tokio::task::spawn_blocking(move || events_store.delete_events(&events_session));

    let (messages_r, portrait_r, topics_r, events_r) =
        tokio::join!(messages_task, portrait_task, topics_task, events_task);

    let results = vec![
        result_entry("session_messages", messages_r),
        result_entry("user_portrait", portrait_r),
        result_entry("topic_summary", topics_r),
        result_entry("chat_event", events_r),
    ];

    state.ingest_queue.delete_by_session(&session_id)?;
    state.profile_queue.delete_by_session(&session_id)?;
    state.topic_queue.delete_by_session(&session_id)?;
    state.event_queue.delete_by_session(&session_id)?;

    let all_succeeded = results.iter().all(|r| r.success);
    Ok(Envelope::aggregate(
        all_succeeded,
        DeleteResponseBody { results },
    ))
}

fn result_entry(
    service: &str,
    joined: std::result::Result<
        std::result::Result<usize, continuity_store::StoreError>,
        tokio::task::JoinError,
    >,
) -> DeleteResultEntry {
    match joined {
        Ok(Ok(_)) => DeleteResultEntry {
            service: service.to_string(),
            success: true,
            error: None,
        },
        Ok(Err(e)) => DeleteResultEntry {
            service: service.to_string(),
            success: false,
            error: Some(e.to_string()),
        },
        Err(e) => DeleteResultEntry {
            service: service.to_string(),
            success: false,
            error: Some(e.to_string()),
        },
    }
}
