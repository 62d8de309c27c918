use std::sync::Arc;

use chrono::Utc;
use continuity_core::salvage::salvage_json;
use continuity_llm::{ChatRequest, LlmProvider};
use continuity_store::Store;
use tracing::{info, instrument};

use crate::{error::Result, merge::merge_portrait, prompt::build_prompt};

/// Incremental user-profile merge worker (component C).
pub struct ProfileWorker {
    store: Store,
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    reasoning_effort: String,
}

impl ProfileWorker {
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

    /// Process one claimed batch of user-only text for `session_id`.
    ///
    /// An empty salvage result is a successful no-op — it preserves the
    /// existing portrait rather than erasing it.
    #[instrument(skip(self, user_texts), fields(session_id))]
    pub async fn process(&self, session_id: &str, user_texts: &[String]) -> Result<()> {
        if user_texts.is_empty() {
            return Ok(());
        }

        let portrait = self.store.get_portrait_or_empty(session_id)?;
        let now = Utc::now();
        let prompt = build_prompt(&portrait, user_texts, &now.to_rfc3339());

        let response = self
            .llm
            .send(&ChatRequest {
                model: self.model.clone(),
                system: "You are a precise, conservative user-profile extractor.".to_string(),
                prompt,
                temperature: self.temperature,
                reasoning_effort: Some(self.reasoning_effort.clone()),
            })
            .await?;

        let salvaged = salvage_json(&response.content);
        if salvaged.is_empty() {
            info!(session_id, "profile extraction yielded no JSON, preserving portrait");
            return Ok(());
        }

        let merged = merge_portrait(&portrait, &salvaged);
        self.store.upsert_portrait(session_id, &merged, &now.to_rfc3339())?;
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

    fn worker(content: &str) -> ProfileWorker {
        let store = Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        ProfileWorker::new(
            store,
            Arc::new(StubProvider {
                content: content.to_string(),
            }),
            "gpt-4o-mini".to_string(),
            0.2,
            "minimal".to_string(),
        )
    }

    #[tokio::test]
    async fn empty_user_texts_is_noop() {
        let w = worker("{}");
        w.process("sess", &[]).await.unwrap();
        assert!(w.store.get_portrait("sess").unwrap().is_none());
    }

    #[tokio::test]
    async fn unsalvageable_response_preserves_empty_portrait() {
        let w = worker("not json");
        w.process("sess", &["hi".to_string()]).await.unwrap();
        assert!(w.store.get_portrait("sess").unwrap().is_none());
    }

    #[tokio::test]
    async fn valid_response_merges_into_portrait() {
        let w = worker(r#"{"basic_information": {"age": "late twenties"}}"#);
        w.process("sess", &["I'm in my late twenties".to_string()])
            .await
            .unwrap();
        let doc = w.store.get_portrait("sess").unwrap().unwrap();
        let obj = doc.user_portrait.as_object().unwrap();
        let basic = obj["basic_information"].as_object().unwrap();
        assert_eq!(basic["age"].as_str(), Some("late twenties"));
    }
}
