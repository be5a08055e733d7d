#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod server;

use std::sync::Arc;
use std::time::Duration;

use args::Args;
use clap::Parser;
use wayfinder_classifier::Classifier;
use wayfinder_config::Config;
use wayfinder_data::{DataEngine, HttpRecordStore};
use wayfinder_llm::LlmGateway;
use wayfinder_observability::Metrics;
use wayfinder_rag::{HttpVectorStore, RagEngine};
use wayfinder_router::QueryRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config)?;

    tracing::info!(
        config_path = %args.config.display(),
        providers = config.llm.providers.len(),
        "starting wayfinder"
    );

    let router = build_router(&config).await?;
    let app = server::app(router);

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(listen = %args.listen, "serving queries");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("wayfinder stopped");
    Ok(())
}

/// Wire the core from configuration
async fn build_router(config: &Config) -> anyhow::Result<QueryRouter> {
    let metrics = Arc::new(Metrics::new(config.observability.window_size));
    let gateway = Arc::new(LlmGateway::from_config(&config.llm, Arc::clone(&metrics)));

    let encoder = Classifier::encoder_from_config(&config.classifier);
    let classifier = Classifier::build(&config.classifier, encoder).await;

    let store_timeout = Duration::from_millis(config.stores.timeout_ms);

    let record_store_url = config
        .stores
        .record_store_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("stores.record_store_url is required"))?;
    let data = DataEngine::new(
        Arc::new(HttpRecordStore::new(record_store_url)),
        config.data.clone(),
        store_timeout,
    );

    let vector_store_url = config
        .stores
        .vector_store_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("stores.vector_store_url is required"))?;
    let rag = RagEngine::new(
        Arc::new(HttpVectorStore::new(vector_store_url)),
        Arc::clone(&gateway),
        config.rag.clone(),
        store_timeout,
    );

    Ok(QueryRouter::new(
        classifier,
        data,
        rag,
        gateway,
        metrics,
        &config.router,
        &config.rag,
    ))
}

/// Set up the tracing subscriber from the logging section
fn init_logging(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    }

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
