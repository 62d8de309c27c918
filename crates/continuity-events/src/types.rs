use serde::{Deserialize, Serialize};

/// One key-event extraction job: the paired turns a `mark_task(2, ...)`
/// claim picked up, each carrying the timestamp the dispatcher attached
/// (the record's own `created_at`, since message-window records are
/// already paired turns rather than a flat sequence needing regrouping).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventJobPayload {
    pub session_id: String,
    pub turns: Vec<EventTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTurn {
    pub user_content: String,
    pub assistant_content: String,
    pub timestamp: String,
}
