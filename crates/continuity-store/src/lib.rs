//! Shared artifact store: one embedded SQLite database holding the message
//! window, user portraits, topic summaries/index, and key events behind a
//! single `Store` handle.

mod db;
mod error;
mod events;
mod manager;
mod messages;
mod portrait;
mod topics;
mod types;

pub use error::{Result, StoreError};
pub use manager::Store;
pub use types::{
    ActiveTopicEntry, EventRecord, EventType, MessageRecord, RoleMessage, SessionEvents,
    TopicIndexDoc, TopicRecord, UserPortraitDoc, PORTRAIT_CATEGORIES,
};
