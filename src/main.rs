//! FaceFind HTTP server entrypoint.

use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use facefind::cache::ComparisonCaches;
use facefind::config::{Config, DEFAULT_PORT};
use facefind::embedding::{EmbeddingProvider, ImageEmbedder};
use facefind::gateway::{HandlerState, create_router_with_limit};
use facefind::pipeline::ComparisonPipeline;
use facefind::search::{CorpusProvider, DirectoryCorpus, InMemoryCorpus};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr = config.socket_addr();

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        model = %config.model_name,
        "FaceFind starting"
    );

    if config.embedding_url.is_none() {
        tracing::warn!("No FACEFIND_EMBEDDING_URL configured, running embedder in stub mode");
    }
    let embedder = ImageEmbedder::load(config.embedder_config())?;

    tracing::info!("Warming up embedding provider...");
    if let Err(e) = embedder.warm_up().await {
        tracing::warn!("Embedding warm-up failed: {}. First request may be slow.", e);
    } else {
        tracing::info!("Warm-up complete.");
    }

    let corpus: Arc<dyn CorpusProvider> = match &config.corpus_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Serving corpus directory");
            Arc::new(DirectoryCorpus::new(path.clone()))
        }
        None => {
            tracing::warn!("No FACEFIND_CORPUS_PATH configured, searches will return no matches");
            Arc::new(InMemoryCorpus::default())
        }
    };

    let caches = Arc::new(ComparisonCaches::new(config.cache_capacity));
    let pipeline = ComparisonPipeline::new(Arc::new(embedder), caches);
    let state = HandlerState::new(pipeline, corpus, config.search_options());

    let app = create_router_with_limit(state, config.max_upload_bytes);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("FaceFind shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("FACEFIND_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let url = format!("http://127.0.0.1:{}/api/health", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
