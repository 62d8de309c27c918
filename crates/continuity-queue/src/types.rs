use serde::{Deserialize, Serialize};

/// One job passing through a derivation queue.
///
/// `task_id` is assigned on first enqueue and never changes across retries;
/// `retry` is bumped by the caller each time the job is pushed back after a
/// transient failure. `payload` is service-specific — the profile/topic/event
/// workers each define their own payload shape and store it here pre-serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub task_id: String,
    pub session_id: String,
    /// Unix millis at enqueue time.
    pub timestamp: i64,
    #[serde(default)]
    pub retry: u32,
    pub payload: serde_json::Value,
}

impl QueueMessage {
    pub fn new(session_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            task_id: continuity_core::TaskId::new().to_string(),
            session_id: session_id.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            retry: 0,
            payload,
        }
    }

    pub fn with_incremented_retry(mut self) -> Self {
        self.retry += 1;
        self
    }
}
