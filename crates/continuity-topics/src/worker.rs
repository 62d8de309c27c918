use std::sync::Arc;

use chrono::Utc;
use continuity_core::{keywords::extract_keywords, salvage::salvage_json};
use continuity_llm::{ChatRequest, LlmProvider};
use continuity_store::Store;
use tracing::{info, instrument, warn};

use crate::{error::Result, index::update_active_topics, prompt::build_prompt, types::TopicTurn};

/// Topic-summary extraction worker (component D, write side).
pub struct TopicWorker {
    store: Store,
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    reasoning_effort: String,
    max_topic_count: usize,
}

impl TopicWorker {
    pub fn new(
        store: Store,
        llm: Arc<dyn LlmProvider>,
        model: String,
        temperature: f32,
        reasoning_effort: String,
        max_topic_count: usize,
    ) -> Self {
        Self {
            store,
            llm,
            model,
            temperature,
            reasoning_effort,
            max_topic_count,
        }
    }

    #[instrument(skip(self, turns), fields(session_id))]
    pub async fn process(&self, session_id: &str, turns: &[TopicTurn]) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }

        let prompt = build_prompt(turns);
        let response = self
            .llm
            .send(&ChatRequest {
                model: self.model.clone(),
                system: "You extract short topic labels and one-sentence summaries.".to_string(),
                prompt,
                temperature: self.temperature,
                reasoning_effort: Some(self.reasoning_effort.clone()),
            })
            .await?;

        let salvaged = salvage_json(&response.content);
        if salvaged.is_empty() {
            info!(session_id, "topic extraction yielded no JSON, skipping");
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut extracted_topics = Vec::new();

        for (topic, content_val) in salvaged {
            let Some(content) = content_val.as_str() else {
                warn!(session_id, topic = %topic, "topic summary is not a string, dropping");
                continue;
            };
            if topic.trim().is_empty() || content.trim().is_empty() {
                continue;
            }

            let keywords = extract_keywords(content);
            self.store
                .insert_topic_record(session_id, &topic, content, &keywords, &now)?;
            extracted_topics.push(topic);
        }

        if extracted_topics.is_empty() {
            return Ok(());
        }

        self.evict_excess_topics(session_id)?;
        self.refresh_active_topics(session_id, &extracted_topics, &now)?;
        Ok(())
    }

    fn evict_excess_topics(&self, session_id: &str) -> Result<()> {
        let count = self.store.distinct_topic_count(session_id)?;
        if count <= self.max_topic_count {
            return Ok(());
        }
        let excess = count - self.max_topic_count;
        let oldest = self.store.oldest_topics_by_earliest_record(session_id, excess)?;
        let removed = self.store.delete_topics_by_name(session_id, &oldest)?;
        info!(session_id, excess, removed, "evicted oldest topics over cap");
        Ok(())
    }

    fn refresh_active_topics(&self, session_id: &str, extracted: &[String], now: &str) -> Result<()> {
        let topic_count = self.store.distinct_topic_count(session_id)?;
        let info = self.store.get_topic_info(session_id)?;
        let updated = update_active_topics(info.active_topics, extracted, now, topic_count);
        self.store.upsert_topic_info(session_id, topic_count, &updated, now)?;
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

    fn worker(content: &str, max_topic_count: usize) -> TopicWorker {
        let store = Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        TopicWorker::new(
            store,
            Arc::new(StubProvider {
                content: content.to_string(),
            }),
            "gpt-4o-mini".to_string(),
            0.2,
            "minimal".to_string(),
            max_topic_count,
        )
    }

    fn turn(user: &str) -> TopicTurn {
        TopicTurn {
            user_content: user.to_string(),
            assistant_content: String::new(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn extracts_and_activates_topic() {
        let w = worker(r#"{"cafe": "went to a cafe downtown"}"#, 60);
        w.process("sess", &[turn("I went to a cafe downtown")])
            .await
            .unwrap();

        let info = w.store.get_topic_info("sess").unwrap();
        assert_eq!(info.topic_count, 1);
        assert_eq!(info.active_topics.len(), 1);
        assert_eq!(info.active_topics[0].topic, "cafe");
    }

    #[tokio::test]
    async fn drops_empty_topic_or_content() {
        let w = worker(r#"{"": "empty topic", "real": ""}"#, 60);
        w.process("sess", &[turn("hi")]).await.unwrap();
        assert_eq!(w.store.distinct_topic_count("sess").unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_turns_is_noop() {
        let w = worker(r#"{"cafe": "x"}"#, 60);
        w.process("sess", &[]).await.unwrap();
        assert_eq!(w.store.distinct_topic_count("sess").unwrap(), 0);
    }
}
