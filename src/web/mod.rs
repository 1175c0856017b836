//! HTTP API over the hybrid question search.
//!
//! Endpoints:
//! - `GET /` - liveness greeting
//! - `GET /search?query=..&top_k=..` - fused search results
//! - `GET /health` - status and version
//! - `GET /metrics` - Prometheus metrics

pub mod handlers;
pub mod routes;
pub mod state;

pub use state::AppState;

use anyhow::{Context, Result};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Serve on `host:port` until the process is stopped.
    pub async fn start(self, host: &str, port: u16) -> Result<()> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = routes::create_router(self.state).layer(cors);

        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        info!("Starting web server at http://{}", addr);

        axum::serve(listener, app)
            .await
            .with_context(|| "Web server failed")?;

        Ok(())
    }
}
