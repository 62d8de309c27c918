use continuity_core::{RetentionConfig, TaskId};
use continuity_events::{EventJobPayload, EventTurn};
use continuity_queue::{Queue, QueueMessage};
use continuity_store::Store;
use continuity_topics::{TopicJobPayload, TopicTurn};
use continuity_window::WindowEngine;
use continuity_profile::ProfileJobPayload;

use crate::{types::DispatchJobPayload, worker::pool::JobProcessor};

/// Implements the dispatcher-worker algorithm: persist the turn to the
/// message window, then fan out to the profile/topic/event queues on
/// cadence, then sweep retention. One dequeue of the ingest queue runs this
/// whole sequence; a failure anywhere propagates to [`crate::worker::pool`]
/// for retry/dead-letter handling.
pub struct DispatchProcessor {
    pub store: Store,
    pub window: WindowEngine,
    pub profile_queue: Queue,
    pub topic_queue: Queue,
    pub event_queue: Queue,
    pub retention: RetentionConfig,
}

#[async_trait::async_trait]
impl JobProcessor for DispatchProcessor {
    fn name(&self) -> &str {
        "dispatch"
    }

    async fn handle(&self, msg: &QueueMessage) -> anyhow::Result<()> {
        let payload: DispatchJobPayload = serde_json::from_value(msg.payload.clone())?;
        let session_id = payload.session_id.as_str();
        let now = chrono::Utc::now().to_rfc3339();

        // Step 1: persist the turn.
        self.window
            .upload(session_id, &payload.messages, &msg.task_id, &now)?;

        // Step 2: read the current window size.
        let count = self.window.count(session_id)?;

        // Step 3: fan out on cadence, in order event/profile/topic.
        if count % self.retention.event_round as usize == 0 {
            self.trigger_event(session_id)?;
        }
        if count % self.retention.user_round as usize == 0 {
            self.trigger_profile(session_id)?;
        }
        if count % self.retention.topic_round as usize == 0 {
            self.trigger_topic(session_id)?;
        }

        // Step 4: retention sweep.
        if count >= self.retention.clear_round as usize {
            self.window
                .clean(session_id, self.retention.project_messages_count)?;
        }

        Ok(())
    }
}

impl DispatchProcessor {
    fn trigger_event(&self, session_id: &str) -> anyhow::Result<()> {
        let task_id = TaskId::new().to_string();
        let claimed = self.store.mark_task(session_id, 2, &task_id)?;
        if claimed.is_empty() {
            return Ok(());
        }
        let turns = claimed
            .iter()
            .map(|r| EventTurn {
                user_content: r.user_content.clone(),
                assistant_content: r.assistant_content.clone(),
                timestamp: r.created_at.clone(),
            })
            .collect();
        let payload = serde_json::to_value(EventJobPayload {
            session_id: session_id.to_string(),
            turns,
        })?;
        self.event_queue
            .enqueue(&QueueMessage::new(session_id, payload))?;
        Ok(())
    }

    fn trigger_profile(&self, session_id: &str) -> anyhow::Result<()> {
        let task_id = TaskId::new().to_string();
        let claimed = self.store.mark_task(session_id, 1, &task_id)?;
        if claimed.is_empty() {
            return Ok(());
        }
        let user_texts = claimed
            .iter()
            .filter(|r| !r.user_content.is_empty())
            .map(|r| r.user_content.clone())
            .collect();
        let payload = serde_json::to_value(ProfileJobPayload {
            session_id: session_id.to_string(),
            user_texts,
        })?;
        self.profile_queue
            .enqueue(&QueueMessage::new(session_id, payload))?;
        Ok(())
    }

    fn trigger_topic(&self, session_id: &str) -> anyhow::Result<()> {
        let task_id = TaskId::new().to_string();
        let claimed = self.store.mark_task(session_id, 3, &task_id)?;
        if claimed.is_empty() {
            return Ok(());
        }
        let turns = claimed
            .iter()
            .map(|r| TopicTurn {
                user_content: r.user_content.clone(),
                assistant_content: r.assistant_content.clone(),
                created_at: r.created_at.clone(),
            })
            .collect();
        let payload = serde_json::to_value(TopicJobPayload {
            session_id: session_id.to_string(),
            turns,
        })?;
        self.topic_queue
            .enqueue(&QueueMessage::new(session_id, payload))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuity_window::InboundMessage;
    use std::sync::{Arc, Mutex};

    fn processor(retention: RetentionConfig) -> DispatchProcessor {
        let conn = Arc::new(Mutex::new(rusqlite::Connection::open_in_memory().unwrap()));
        let store = Store::from_shared(conn.clone()).unwrap();
        let window = WindowEngine::new(store.clone());
        DispatchProcessor {
            store,
            window,
            profile_queue: Queue::new(conn.clone(), "profile").unwrap(),
            topic_queue: Queue::new(conn.clone(), "topic").unwrap(),
            event_queue: Queue::new(conn, "event").unwrap(),
            retention,
        }
    }

    fn job(session_id: &str) -> QueueMessage {
        let messages = vec![
            InboundMessage::user("hello"),
            InboundMessage::assistant("hi there"),
        ];
        let payload = serde_json::to_value(DispatchJobPayload {
            session_id: session_id.to_string(),
            messages,
        })
        .unwrap();
        QueueMessage::new(session_id, payload)
    }

    #[tokio::test]
    async fn first_turn_fans_out_to_every_derivation_queue_when_all_rounds_are_one() {
        let p = processor(RetentionConfig {
            user_round: 1,
            event_round: 1,
            topic_round: 1,
            clear_round: 100,
            ..RetentionConfig::default()
        });
        p.handle(&job("sess-1")).await.unwrap();

        assert_eq!(p.profile_queue.length().unwrap(), 1);
        assert_eq!(p.topic_queue.length().unwrap(), 1);
        assert_eq!(p.event_queue.length().unwrap(), 1);
        assert_eq!(p.window.count("sess-1").unwrap(), 1);
    }

    #[tokio::test]
    async fn cadence_skips_queues_whose_round_has_not_arrived() {
        let p = processor(RetentionConfig {
            user_round: 1,
            event_round: 5,
            topic_round: 1,
            clear_round: 100,
            ..RetentionConfig::default()
        });
        // First turn: count=1, 1 % 5 != 0, so no event job this round.
        p.handle(&job("sess-2")).await.unwrap();

        assert_eq!(p.profile_queue.length().unwrap(), 1);
        assert_eq!(p.topic_queue.length().unwrap(), 1);
        assert_eq!(p.event_queue.length().unwrap(), 0);
    }

    #[tokio::test]
    async fn clear_round_triggers_retention_sweep() {
        let p = processor(RetentionConfig {
            user_round: 1,
            event_round: 1,
            topic_round: 1,
            clear_round: 1,
            project_messages_count: 0,
            ..RetentionConfig::default()
        });
        p.handle(&job("sess-3")).await.unwrap();

        // All three tasks were claimed and project_messages_count=0, so the
        // single fully-claimed record is swept away.
        assert_eq!(p.window.count("sess-3").unwrap(), 0);
    }

    #[tokio::test]
    async fn repeat_trigger_for_same_session_is_a_noop_on_already_claimed_records() {
        let p = processor(RetentionConfig {
            user_round: 1,
            event_round: 1,
            topic_round: 1,
            clear_round: 100,
            ..RetentionConfig::default()
        });
        p.handle(&job("sess-4")).await.unwrap();
        // Second turn re-triggers every round (count=2), but the first
        // record is already claimed on all three tasks, so only the new
        // record's claims enqueue new jobs - still exactly one job per
        // queue per call, not a growing backlog of duplicates.
        p.handle(&job("sess-4")).await.unwrap();

        assert_eq!(p.profile_queue.length().unwrap(), 2);
        assert_eq!(p.topic_queue.length().unwrap(), 2);
        assert_eq!(p.event_queue.length().unwrap(), 2);
    }
}
