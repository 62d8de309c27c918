//! Topic-summary worker + retriever (component D): per-topic one-sentence
//! summaries, active-list maintenance, and two-phase (active + lexical)
//! retrieval.

mod error;
mod index;
mod prompt;
mod retriever;
mod types;
mod worker;

pub use error::{Result, TopicError};
pub use index::update_active_topics;
pub use retriever::TopicRetriever;
pub use types::{TopicJobPayload, TopicSearchResult, TopicTurn};
pub use worker::TopicWorker;
