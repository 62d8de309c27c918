use continuity_window::InboundMessage;
use serde::{Deserialize, Serialize};

/// The payload queued by `/memory/upload`: one turn's flat role-tagged
/// message sequence plus the session it belongs to, handed to a
/// dispatcher-worker for pairing, cadence checks, and fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchJobPayload {
    pub session_id: String,
    pub messages: Vec<InboundMessage>,
}

/// `POST /memory/upload` request body. `session_id` is used verbatim if
/// present; otherwise it is synthesized from the non-empty parts of
/// `group_id`/`user_id`/`role_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    pub messages: Vec<InboundMessage>,
}

/// Shared triplet/`session_id` resolution used by upload, query, apply, and
/// the message-window read endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionRef {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

impl SessionRef {
    /// Resolve to a concrete session id: the explicit `session_id` if given,
    /// else the triplet synthesis. `None` means the caller supplied nothing
    /// usable — a validation error, not a retryable one.
    pub fn resolve(&self) -> Option<String> {
        if let Some(sid) = &self.session_id {
            if !sid.is_empty() {
                return Some(sid.clone());
            }
        }
        continuity_core::generate_session_id(
            self.group_id.as_deref().unwrap_or(""),
            self.user_id.as_deref().unwrap_or(""),
            self.role_id.as_deref().unwrap_or(""),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskIdResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    #[serde(default)]
    pub query: Option<String>,
}

/// Same past/future buckets as [`continuity_store::SessionEvents`], relabeled
/// to the `/memory/query` wire contract's `completed`/`todo` naming.
#[derive(Debug, Clone, Serialize)]
pub struct ChatEventsBody {
    pub completed: Vec<continuity_store::EventRecord>,
    pub todo: Vec<continuity_store::EventRecord>,
}

impl From<continuity_store::SessionEvents> for ChatEventsBody {
    fn from(events: continuity_store::SessionEvents) -> Self {
        Self {
            completed: events.past,
            todo: events.future,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponseBody {
    pub user_portrait: continuity_core::Node,
    pub topic_summary: continuity_topics::TopicSearchResult,
    pub chat_events: ChatEventsBody,
    pub session_messages: Vec<continuity_store::RoleMessage>,
    pub current_time: String,
}

impl From<continuity_compose::QueryResult> for QueryResponseBody {
    fn from(result: continuity_compose::QueryResult) -> Self {
        Self {
            user_portrait: result.user_portrait,
            topic_summary: result.topic_summary,
            chat_events: result.chat_events.into(),
            session_messages: result.session_messages,
            current_time: result.current_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    pub role_prompt: String,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesRequest {
    #[serde(flatten)]
    pub session: SessionRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponseBody {
    pub messages: Vec<continuity_store::RoleMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResultEntry {
    pub service: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponseBody {
    pub results: Vec<DeleteResultEntry>,
}

// -- per-artifact endpoints ---------------------------------------------------
// Each of the four derivation services exposes its own `/upload` directly
// invoking that worker's `process()` synchronously, bypassing the dispatcher's
// cadence/queue path entirely. Useful for backfills and direct testing of one
// artifact in isolation.

#[derive(Debug, Clone, Deserialize)]
pub struct SessionMessagesUploadRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkTaskRequest {
    pub session_id: String,
    pub task_index: u8,
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkTaskResponseBody {
    pub claimed: Vec<continuity_store::MessageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResponseBody {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanResponseBody {
    pub deleted: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUploadRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    pub user_texts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicUploadRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    pub turns: Vec<continuity_topics::TopicTurn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventUploadRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    pub turns: Vec<continuity_events::EventTurn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCountResponseBody {
    pub deleted: usize,
}

// -- optional chat relay ------------------------------------------------------

/// `POST /v1/response` request body: a role-play turn to answer in-context,
/// using the same memory-composition path as `/memory/apply`. `query` is
/// both the text retrieval handed to `Apply` and the user's spoken turn.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayRequest {
    #[serde(flatten)]
    pub session: SessionRef,
    #[serde(default)]
    pub role_prompt: String,
    pub query: String,
    #[serde(default)]
    pub first_message: Option<String>,
    #[serde(default)]
    pub stream: Option<bool>,
}

/// One SSE frame's `data` payload, matching the dispatcher's `{code, msg, data}`
/// envelope so relay clients can reuse the same parsing path as every other
/// endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RelayChunk {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_explicit_session_id() {
        let r = SessionRef {
            session_id: Some("explicit".to_string()),
            user_id: Some("u1".to_string()),
            role_id: Some("r1".to_string()),
            group_id: Some("g1".to_string()),
        };
        assert_eq!(r.resolve(), Some("explicit".to_string()));
    }

    #[test]
    fn resolve_falls_back_to_triplet_synthesis_when_session_id_is_empty() {
        let r = SessionRef {
            session_id: Some(String::new()),
            user_id: Some("u1".to_string()),
            role_id: Some("r1".to_string()),
            group_id: None,
        };
        assert_eq!(r.resolve(), Some("u1_r1".to_string()));
    }

    #[test]
    fn resolve_is_none_when_nothing_usable_is_supplied() {
        let r = SessionRef::default();
        assert_eq!(r.resolve(), None);
    }
}
