pub mod chat_event;
pub mod health;
pub mod memory;
pub mod relay;
pub mod session_messages;
pub mod topic_summary;
pub mod user_portrait;
