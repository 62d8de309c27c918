use std::sync::Arc;

use chrono::Utc;
use continuity_core::salvage::salvage_json;
use continuity_llm::{ChatRequest, LlmProvider};
use continuity_store::{EventType, Store};
use tracing::{info, instrument, warn};

use crate::{error::Result, prompt::build_prompt, timestamp::parse_event_timestamp, types::EventTurn};

/// Key-event extraction worker (component E): timestamped events,
/// classified past vs. future.
pub struct EventWorker {
    store: Store,
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    reasoning_effort: String,
}

impl EventWorker {
    pub fn new(
        store: Store,
        llm: Arc<dyn LlmProvider>,
        model: String,
        temperature: f32,
        reasoning_effort: String,
    ) -> Self {
        Self {
            store,
            llm,
            model,
            temperature,
            reasoning_effort,
        }
    }

    #[instrument(skip(self, turns), fields(session_id))]
    pub async fn process(&self, session_id: &str, turns: &[EventTurn]) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }

        let prompt = build_prompt(turns);
        let response = self
            .llm
            .send(&ChatRequest {
                model: self.model.clone(),
                system: "You extract timestamped key events from role-play conversations.".to_string(),
                prompt,
                temperature: self.temperature,
                reasoning_effort: Some(self.reasoning_effort.clone()),
            })
            .await?;

        let salvaged = salvage_json(&response.content);
        if salvaged.is_empty() {
            info!(session_id, "event extraction yielded no JSON, skipping");
            return Ok(());
        }

        let now = Utc::now();
        for (ts_raw, event_val) in salvaged {
            let Some(event) = event_val.as_str() else {
                warn!(session_id, ts = %ts_raw, "event description is not a string, skipping");
                continue;
            };
            if event.trim().is_empty() {
                continue;
            }

            let Some(parsed) = parse_event_timestamp(&ts_raw, now) else {
                warn!(session_id, ts = %ts_raw, "could not parse event timestamp, skipping");
                continue;
            };

            let event_type = EventType::classify(parsed, now);
            self.store.insert_event(
                session_id,
                event,
                &parsed.to_rfc3339(),
                &now.to_rfc3339(),
                event_type,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use continuity_llm::{ChatResponse, ProviderError};

    struct StubProvider {
        content: String,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn send(&self, _req: &ChatRequest) -> std::result::Result<ChatResponse, ProviderError> {
            Ok(ChatResponse {
                content: self.content.clone(),
                model: "stub".to_string(),
                tokens_in: 0,
                tokens_out: 0,
            })
        }
    }

    fn worker(content: &str) -> EventWorker {
        let store = Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        EventWorker::new(
            store,
            Arc::new(StubProvider {
                content: content.to_string(),
            }),
            "gpt-4o-mini".to_string(),
            0.2,
            "minimal".to_string(),
        )
    }

    fn turn(user: &str, ts: &str) -> EventTurn {
        EventTurn {
            user_content: user.to_string(),
            assistant_content: String::new(),
            timestamp: ts.to_string(),
        }
    }

    #[tokio::test]
    async fn classifies_past_and_future_events() {
        let w = worker(r#"{"2099-01-01T00:00:00Z": "meet at cafe", "2000-01-01T00:00:00Z": "walked"}"#);
        w.process("sess", &[turn("hi", "2026-01-01T00:00:00Z")])
            .await
            .unwrap();

        let events = w.store.get_session_events("sess").unwrap();
        assert_eq!(events.future.len(), 1);
        assert_eq!(events.past.len(), 1);
    }

    #[tokio::test]
    async fn unparseable_timestamp_is_skipped_not_failed() {
        let w = worker(r#"{"sometime next week": "vague event"}"#);
        w.process("sess", &[turn("hi", "2026-01-01T00:00:00Z")])
            .await
            .unwrap();
        let events = w.store.get_session_events("sess").unwrap();
        assert_eq!(events.past.len(), 0);
        assert_eq!(events.future.len(), 0);
    }
}
