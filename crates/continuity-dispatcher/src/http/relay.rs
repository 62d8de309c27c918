use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use continuity_llm::ChatRequest;
use continuity_queue::QueueMessage;
use continuity_window::InboundMessage;
use futures_util::stream;
use tracing::warn;

use crate::{
    error::{DispatcherError, Result},
    types::{DispatchJobPayload, RelayChunk, RelayRequest},
    AppState,
};

/// `POST /v1/response` — optional chat relay: composes the session's
/// memory into a system prompt, asks the configured LLM for a reply, and
/// streams it back as SSE. The underlying provider only supports
/// non-streaming completions, so this relay emits the whole reply as one
/// `data:` frame followed by `data: [DONE]` rather than real token deltas —
/// it satisfies the same wire contract a true stream would, honestly
/// scoped to what `OpenAiProvider` can do today. `stream` is accepted for
/// wire compatibility but does not change this.
///
/// First-turn override: if `Apply` finds an empty message window and the
/// caller supplied `first_message`, no LLM call is made — the relay
/// persists a synthetic `{user:"", assistant:first_message}` pair directly
/// so the session has a starting point, and replies with `first_message`
/// verbatim, letting the model continue fresh from there next turn.
///
/// Otherwise, after the reply is produced, the turn (user query + assistant
/// reply) is posted back onto the ingest queue in the background, the same
/// way `/memory/upload` would, so the exchange becomes part of the
/// session's memory without the caller having to upload it separately.
pub async fn response(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RelayRequest>,
) -> Result<Sse<impl futures_util::Stream<Item = std::result::Result<Event, Infallible>>>> {
    let session_id = req
        .session
        .resolve()
        .ok_or_else(|| DispatcherError::Validation("no usable session identity".to_string()))?;

    let apply_result = state
        .compose
        .apply(&session_id, &req.role_prompt, Some(req.query.as_str()))
        .await?;

    let content = if apply_result.messages.is_empty() {
        if let Some(first_message) = req.first_message.clone() {
            let now = chrono::Utc::now().to_rfc3339();
            state
                .window
                .upload(
                    &session_id,
                    &[InboundMessage::assistant(first_message.clone())],
                    &continuity_core::TaskId::new().to_string(),
                    &now,
                )?;
            first_message
        } else {
            send_completion(&state, &session_id, &apply_result.system_prompt, &req.query).await?
        }
    } else {
        send_completion(&state, &session_id, &apply_result.system_prompt, &req.query).await?
    };

    let frame = serde_json::json!({
        "code": 0,
        "msg": "ok",
        "data": RelayChunk { content },
    });
    let events = vec![
        Ok(Event::default().data(frame.to_string())),
        Ok(Event::default().data("[DONE]")),
    ];

    Ok(Sse::new(stream::iter(events)))
}

async fn send_completion(
    state: &Arc<AppState>,
    session_id: &str,
    system_prompt: &str,
    query: &str,
) -> Result<String> {
    let chat_response = state
        .llm
        .send(&ChatRequest {
            model: state.config.llm.model.clone(),
            system: system_prompt.to_string(),
            prompt: query.to_string(),
            temperature: state.config.llm.temperature,
            reasoning_effort: Some(state.config.llm.reasoning_effort.clone()),
        })
        .await?;

    let content = chat_response.content.clone();
    post_back(state, session_id, query, &content);
    Ok(content)
}

fn post_back(state: &Arc<AppState>, session_id: &str, user_message: &str, assistant_reply: &str) {
    let state = state.clone();
    let session_id = session_id.to_string();
    let user_message = user_message.to_string();
    let assistant_reply = assistant_reply.to_string();
    tokio::spawn(async move {
        let messages = vec![
            InboundMessage::user(user_message),
            InboundMessage::assistant(assistant_reply),
        ];
        let payload = match serde_json::to_value(DispatchJobPayload {
            session_id: session_id.clone(),
            messages,
        }) {
            Ok(v) => v,
            Err(e) => {
                warn!(session_id, error = %e, "relay post-back serialization failed");
                return;
            }
        };
        if let Err(e) = state
            .ingest_queue
            .enqueue(&QueueMessage::new(session_id.clone(), payload))
        {
            warn!(session_id, error = %e, "relay post-back enqueue failed");
        }
    });
}
