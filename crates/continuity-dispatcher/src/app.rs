use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use continuity_compose::ComposeEngine;
use continuity_core::ContinuityConfig;
use continuity_events::EventWorker;
use continuity_llm::LlmProvider;
use continuity_profile::ProfileWorker;
use continuity_queue::{Queue, WebhookClient};
use continuity_store::Store;
use continuity_topics::{TopicRetriever, TopicWorker};
use continuity_window::WindowEngine;

use crate::{auth, http};

/// Central shared state, passed as `Arc<AppState>` to every handler and
/// worker-pool task. One `Store` clone per subsystem, all backed by the
/// same underlying SQLite connection.
pub struct AppState {
    pub config: ContinuityConfig,
    pub store: Store,
    pub window: WindowEngine,
    pub compose: ComposeEngine,
    pub retriever: TopicRetriever,
    pub llm: Arc<dyn LlmProvider>,
    pub profile_worker: ProfileWorker,
    pub topic_worker: TopicWorker,
    pub event_worker: EventWorker,
    pub ingest_queue: Queue,
    pub profile_queue: Queue,
    pub topic_queue: Queue,
    pub event_queue: Queue,
    pub webhook: WebhookClient,
}

/// Assemble the full Axum router: health check is unauthenticated, every
/// other route requires the bearer token configured in `dispatcher.auth_token`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/memory/upload", post(http::memory::upload))
        .route("/memory/query", post(http::memory::query))
        .route("/memory/apply", post(http::memory::apply))
        .route("/memory/messages", post(http::memory::messages))
        .route("/memory/delete", delete(http::memory::delete))
        .route(
            "/session_messages/upload",
            post(http::session_messages::upload),
        )
        .route(
            "/session_messages/get/{session}",
            get(http::session_messages::get),
        )
        .route(
            "/session_messages/delete/{session}",
            delete(http::session_messages::delete),
        )
        .route(
            "/session_messages/count/{session}",
            get(http::session_messages::count),
        )
        .route(
            "/session_messages/mark_task",
            post(http::session_messages::mark_task),
        )
        .route(
            "/session_messages/clean",
            post(http::session_messages::clean),
        )
        .route("/user_portrait/upload", post(http::user_portrait::upload))
        .route(
            "/user_portrait/get/{session}",
            get(http::user_portrait::get),
        )
        .route(
            "/user_portrait/delete/{session}",
            delete(http::user_portrait::delete),
        )
        .route("/topic_summary/upload", post(http::topic_summary::upload))
        .route(
            "/topic_summary/get/{session}",
            get(http::topic_summary::get),
        )
        .route(
            "/topic_summary/delete/{session}",
            delete(http::topic_summary::delete),
        )
        .route(
            "/topic_summary/activate/{session}",
            get(http::topic_summary::activate),
        )
        .route(
            "/topic_summary/search/{session}",
            get(http::topic_summary::search),
        )
        .route("/chat_event/upload", post(http::chat_event::upload))
        .route("/chat_event/get/{session}", get(http::chat_event::get))
        .route(
            "/chat_event/delete/{session}",
            delete(http::chat_event::delete),
        )
        .route("/v1/response", post(http::relay::response))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/healthz", get(http::health::healthz))
        .merge(protected)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
