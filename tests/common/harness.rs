use std::net::SocketAddr;
use std::sync::Arc;

use facefind::gateway::{HandlerState, create_router_with_state};
use facefind::{
    ComparisonCaches, ComparisonPipeline, CorpusProvider, EmbedderConfig, ImageEmbedder,
    SearchOptions,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serves the full router on an ephemeral port with the stub embedder.
pub async fn spawn_test_server(corpus: Arc<dyn CorpusProvider>) -> TestServer {
    let embedder = ImageEmbedder::load(EmbedderConfig::stub()).expect("load stub embedder");
    let pipeline = ComparisonPipeline::new(Arc::new(embedder), Arc::new(ComparisonCaches::default()));
    let state = HandlerState::new(pipeline, corpus, SearchOptions::default());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestServer {
        addr,
        client: reqwest::Client::new(),
        handle,
    }
}
