use chrono::Utc;
use continuity_core::template::compose_strict;
use continuity_store::Store;
use continuity_topics::TopicRetriever;
use continuity_window::WindowEngine;
use tracing::{instrument, warn};

use crate::{
    error::Result,
    render::{render_current_time, render_events_block, render_portrait_block, render_topic_block},
    template::SYSTEM_PROMPT_TEMPLATE,
    types::{ApplyResult, QueryResult},
};

/// The compose engine (component F): fans out the four independent memory
/// reads concurrently, then renders either a raw aggregate (`Query`) or a
/// finished system prompt (`Apply`).
#[derive(Clone)]
pub struct ComposeEngine {
    store: Store,
    window: WindowEngine,
    retriever: TopicRetriever,
}

impl ComposeEngine {
    pub fn new(store: Store, window: WindowEngine, retriever: TopicRetriever) -> Self {
        Self {
            store,
            window,
            retriever,
        }
    }

    /// Four independent blocking reads run concurrently on the blocking
    /// pool. Each is fault-tolerant on its own: a failed read is logged and
    /// substituted with an empty default rather than failing the whole
    /// fan-out, since a partial memory view still beats none.
    async fn fetch(&self, session_id: &str, query: Option<&str>) -> QueryResult {
        let portrait_store = self.store.clone();
        let portrait_session = session_id.to_string();
        let portrait_task = tokio::task::spawn_blocking(move || {
            portrait_store.get_portrait_or_empty(&portrait_session)
        });

        let retriever = self.retriever.clone();
        let topic_session = session_id.to_string();
        let topic_query = query.unwrap_or("").to_string();
        let topic_task =
            tokio::task::spawn_blocking(move || retriever.search(&topic_session, &topic_query));

        let events_store = self.store.clone();
        let events_session = session_id.to_string();
        let events_task =
            tokio::task::spawn_blocking(move || events_store.get_session_events(&events_session));

        let window = self.window.clone();
        let messages_session = session_id.to_string();
        let messages_task = tokio::task::spawn_blocking(move || window.get(&messages_session));

        let (portrait, topic_summary, chat_events, session_messages) =
            tokio::join!(portrait_task, topic_task, events_task, messages_task);

        let user_portrait = portrait
            .ok()
            .and_then(|r| r.ok())
            .unwrap_or_else(|| {
                warn!(session_id, "portrait read failed, substituting empty profile");
                continuity_core::Node::Object(Default::default())
            });

        let topic_summary = topic_summary.ok().and_then(|r| r.ok()).unwrap_or_else(|| {
            warn!(session_id, "topic search failed, substituting empty result");
            Default::default()
        });

        let chat_events = chat_events.ok().and_then(|r| r.ok()).unwrap_or_else(|| {
            warn!(session_id, "event read failed, substituting empty timeline");
            Default::default()
        });

        let session_messages = session_messages.ok().and_then(|r| r.ok()).unwrap_or_else(|| {
            warn!(session_id, "message window read failed, substituting empty window");
            Vec::new()
        });

        QueryResult {
            user_portrait,
            topic_summary,
            chat_events,
            session_messages,
            current_time: render_current_time(Utc::now()),
        }
    }

    #[instrument(skip(self, query), fields(session_id))]
    pub async fn query(&self, session_id: &str, query: Option<&str>) -> Result<QueryResult> {
        Ok(self.fetch(session_id, query).await)
    }

    #[instrument(skip(self, role_prompt, query), fields(session_id))]
    pub async fn apply(
        &self,
        session_id: &str,
        role_prompt: &str,
        query: Option<&str>,
    ) -> Result<ApplyResult> {
        let aggregate = self.fetch(session_id, query).await;

        let mut vars = std::collections::HashMap::new();
        vars.insert("topic_summary".to_string(), render_topic_block(&aggregate.topic_summary));
        vars.insert("user_portrait".to_string(), render_portrait_block(&aggregate.user_portrait));
        vars.insert("chat_events".to_string(), render_events_block(&aggregate.chat_events));
        vars.insert("current_time".to_string(), aggregate.current_time.clone());
        vars.insert("role_prompt".to_string(), role_prompt.to_string());

        let system_prompt = compose_strict(SYSTEM_PROMPT_TEMPLATE, &vars)?;

        Ok(ApplyResult {
            system_prompt,
            messages: aggregate.session_messages,
        })
    }
}
