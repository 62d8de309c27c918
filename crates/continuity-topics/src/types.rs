use serde::{Deserialize, Serialize};

/// One topic-extraction job: the window of turns a `mark_task(3, ...)`
/// claim picked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicJobPayload {
    pub session_id: String,
    pub turns: Vec<TopicTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicTurn {
    pub user_content: String,
    pub assistant_content: String,
    pub created_at: String,
}

/// Two-phase search result: the active-topic shortlist plus the merged,
/// deduplicated record set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicSearchResult {
    pub active_topics: Vec<String>,
    pub records: Vec<continuity_store::TopicRecord>,
}
