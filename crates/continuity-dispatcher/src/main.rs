use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use continuity_compose::ComposeEngine;
use continuity_core::ContinuityConfig;
use continuity_events::EventWorker;
use continuity_llm::{LlmProvider, OpenAiProvider};
use continuity_profile::ProfileWorker;
use continuity_queue::{Queue, QueueMonitor, WebhookClient};
use continuity_store::Store;
use continuity_topics::{TopicRetriever, TopicWorker};
use continuity_window::WindowEngine;
use tokio::sync::watch;
use tracing::info;

mod app;
mod auth;
mod envelope;
mod error;
mod http;
mod types;
mod worker;

pub use app::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "continuity_dispatcher=info,tower_http=debug".into()),
        )
        .init();

    let config_path = std::env::var("CONTINUITY_CONFIG").ok();
    let config = ContinuityConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({}), using defaults", e);
        ContinuityConfig::default()
    });

    let conn = rusqlite::Connection::open(&config.store.path)?;
    let store = Store::new(conn)?;
    let shared_conn = store.shared_connection();

    let window = WindowEngine::new(store.clone());
    let retriever = TopicRetriever::new(store.clone(), config.retention.topic_score_threshold);
    let compose = ComposeEngine::new(store.clone(), window.clone(), retriever.clone());

    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
        config.llm.api_key.clone(),
        Some(config.llm.base_url.clone()),
    ));

    // `*Worker` types are not `Clone`, and each is needed both inside its
    // pool's `JobProcessor` and on `AppState` for the per-artifact direct
    // endpoints, so two independent instances are built from the same
    // cheaply-cloned `store`/`llm` handles rather than sharing one.
    let new_profile_worker = || {
        ProfileWorker::new(
            store.clone(),
            llm.clone(),
            config.llm.model.clone(),
            config.llm.temperature,
            config.llm.reasoning_effort.clone(),
        )
    };
    let new_topic_worker = || {
        TopicWorker::new(
            store.clone(),
            llm.clone(),
            config.llm.model.clone(),
            config.llm.temperature,
            config.llm.reasoning_effort.clone(),
            config.retention.max_topic_count,
        )
    };
    let new_event_worker = || {
        EventWorker::new(
            store.clone(),
            llm.clone(),
            config.llm.model.clone(),
            config.llm.temperature,
            config.llm.reasoning_effort.clone(),
        )
    };

    let ingest_queue = Queue::new(shared_conn.clone(), "ingest")?;
    let profile_queue = Queue::new(shared_conn.clone(), "profile")?;
    let topic_queue = Queue::new(shared_conn.clone(), "topic")?;
    let event_queue = Queue::new(shared_conn.clone(), "event")?;

    let webhook = WebhookClient::spawn(
        config.webhook.url.clone(),
        config.webhook.signing_secret.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dispatch_processor = Arc::new(worker::DispatchProcessor {
        store: store.clone(),
        window: window.clone(),
        profile_queue: profile_queue.clone(),
        topic_queue: topic_queue.clone(),
        event_queue: event_queue.clone(),
        retention: config.retention.clone(),
    });
    let profile_processor = Arc::new(worker::ProfileProcessor {
        worker: new_profile_worker(),
    });
    let topic_processor = Arc::new(worker::TopicProcessor {
        worker: new_topic_worker(),
    });
    let event_processor = Arc::new(worker::EventProcessor {
        worker: new_event_worker(),
    });

    let mut handles = Vec::new();
    handles.extend(worker::spawn_worker_pool(
        dispatch_processor,
        ingest_queue.clone(),
        config.dispatcher.dispatcher_workers,
        config.retention.max_retry,
        webhook.clone(),
        shutdown_rx.clone(),
    ));
    handles.extend(worker::spawn_worker_pool(
        profile_processor,
        profile_queue.clone(),
        config.dispatcher.profile_workers,
        config.retention.max_retry,
        webhook.clone(),
        shutdown_rx.clone(),
    ));
    handles.extend(worker::spawn_worker_pool(
        topic_processor,
        topic_queue.clone(),
        config.dispatcher.topic_workers,
        config.retention.max_retry,
        webhook.clone(),
        shutdown_rx.clone(),
    ));
    handles.extend(worker::spawn_worker_pool(
        event_processor,
        event_queue.clone(),
        config.dispatcher.event_workers,
        config.retention.max_retry,
        webhook.clone(),
        shutdown_rx.clone(),
    ));

    let monitor_interval = Duration::from_secs(config.retention.monitor_interval_secs);
    for queue in [&ingest_queue, &profile_queue, &topic_queue, &event_queue] {
        let monitor = QueueMonitor::new(
            queue.clone(),
            config.retention.queue_maxlen,
            monitor_interval,
            webhook.clone(),
        );
        let shutdown_rx = shutdown_rx.clone();
        handles.push(tokio::spawn(monitor.run(shutdown_rx)));
    }

    let bind = config.dispatcher.bind.clone();
    let port = config.dispatcher.port;

    // Build the per-artifact-endpoint worker instances before `config`,
    // `store`, and `llm` are moved into `AppState` below.
    let state_profile_worker = new_profile_worker();
    let state_topic_worker = new_topic_worker();
    let state_event_worker = new_event_worker();

    let state = Arc::new(AppState {
        config,
        store,
        window,
        compose,
        retriever,
        llm,
        profile_worker: state_profile_worker,
        topic_worker: state_topic_worker,
        event_worker: state_event_worker,
        ingest_queue,
        profile_queue,
        topic_queue,
        event_queue,
        webhook,
    });
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("continuity dispatcher listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
