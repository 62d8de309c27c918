use serde::{Deserialize, Serialize};

/// One profile-derivation job: the `role=user` text of the records a
/// `mark_task(1, ...)` claim picked up. Assistant/system content never
/// reaches this worker — the spec renders only the user's own words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileJobPayload {
    pub session_id: String,
    pub user_texts: Vec<String>,
}
