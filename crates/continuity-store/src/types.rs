use serde::{Deserialize, Serialize};

/// Allow-listed portrait categories. Anything else is silently dropped
/// (and logged) by the profile worker's merge step.
pub const PORTRAIT_CATEGORIES: &[&str] =
    &["basic_information", "interest_topics", "sexual_orientation"];

/// One paired user/assistant turn in the message window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub session_id: String,
    pub user_content: String,
    pub assistant_content: String,
    pub created_at: String,
    /// Turn-level id shared by every record created from one `Upload` call.
    pub messages_id: String,
    pub task1_id: String,
    pub task2_id: String,
    pub task3_id: String,
    pub task4_id: String,
    pub status: String,
}

impl MessageRecord {
    /// True once tasks 1 (profile), 2 (event), and 3 (topic) have all
    /// claimed this record — the deletion-eligibility invariant from §3.
    pub fn fully_claimed(&self) -> bool {
        !self.task1_id.is_empty() && !self.task2_id.is_empty() && !self.task3_id.is_empty()
    }

    pub fn task_id_field(&self, task_index: u8) -> &str {
        match task_index {
            1 => &self.task1_id,
            2 => &self.task2_id,
            3 => &self.task3_id,
            _ => &self.task4_id,
        }
    }
}

/// One role-tagged line out of `Get` — a record yields one or two of these
/// (assistant is omitted when `assistant_content` is empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMessage {
    pub role: String,
    pub content: String,
    pub timestamp: String,
    pub created_at: String,
}

/// One session's structured user profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPortraitDoc {
    pub id: String,
    pub session_id: String,
    pub user_portrait: continuity_core::Node,
    pub created_at: String,
    pub updated_at: String,
}

/// One extracted topic summary entry. Append-only: the same `topic` string
/// can have many records over a session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: String,
    pub session_id: String,
    pub topic: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Populated only by lexical retrieval (`Search`'s phase B).
    pub score: Option<f64>,
}

/// One entry in a session's active-topic shortlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveTopicEntry {
    pub topic: String,
    pub last_active: String,
}

/// Per-session topic index: total topic count plus the active shortlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicIndexDoc {
    pub session_id: String,
    pub topic_count: usize,
    pub active_topics: Vec<ActiveTopicEntry>,
    pub updated_at: String,
}

/// Past (1) vs. future (2) classification of an extracted key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i64)]
pub enum EventType {
    Past = 1,
    Future = 2,
}

impl EventType {
    pub fn classify(event_time: chrono::DateTime<chrono::Utc>, now: chrono::DateTime<chrono::Utc>) -> Self {
        if event_time > now {
            EventType::Future
        } else {
            EventType::Past
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(v: i64) -> Self {
        if v == 2 {
            EventType::Future
        } else {
            EventType::Past
        }
    }
}

/// One extracted, timestamped key event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub session_id: String,
    /// The parsed event time (`created_at` in the spec's field naming).
    pub created_at: String,
    pub event: String,
    /// When the extraction ran (i.e. "now" at ingestion).
    pub execution_time: String,
    pub event_type: EventType,
}

/// Two-bucket view returned by `GetSessionEvents`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionEvents {
    pub past: Vec<EventRecord>,
    pub future: Vec<EventRecord>,
}
