use continuity_core::Node;
use continuity_store::{RoleMessage, SessionEvents};
use continuity_topics::TopicSearchResult;
use serde::{Deserialize, Serialize};

/// Aggregated read-side view of a session's memory, independent of any
/// particular role prompt — the payload behind the `Query` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub user_portrait: Node,
    pub topic_summary: TopicSearchResult,
    pub chat_events: SessionEvents,
    pub session_messages: Vec<RoleMessage>,
    pub current_time: String,
}

/// The `Apply` endpoint's payload: a finished system prompt plus the raw
/// message window, ready to hand to a chat completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub system_prompt: String,
    pub messages: Vec<RoleMessage>,
}
