//! `continuity-queue` — FIFO job queue primitives shared by every derivation
//! worker, plus the queue-length monitor and dead-letter webhook client.
//!
//! Each worker service owns a named [`Queue`] backed by one shared SQLite
//! connection (`job_queue` table). [`Queue::enqueue`]/[`Queue::dequeue`]
//! give at-least-once delivery with FIFO ordering; [`QueueMonitor`] samples
//! [`Queue::length`] on an interval and raises a [`webhook::WebhookAlert`]
//! when a queue backs up past a configured threshold.

pub mod db;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod types;
pub mod webhook;

pub use engine::Queue;
pub use error::{QueueError, Result};
pub use monitor::QueueMonitor;
pub use types::QueueMessage;
pub use webhook::{DeadLetterAlert, QueueLengthAlert, WebhookAlert, WebhookClient};
