//! HTTP server
//!
//! Combines the issue routes with a health probe and CORS, binds the
//! configured address, and serves until the process exits.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::api::{issue_routes, ApiState};
use crate::config::Config;
use crate::observability::Logger;
use crate::store::IssueStore;

/// HTTP server for the issue API.
pub struct HttpServer {
    config: Config,
    router: Router,
}

impl HttpServer {
    pub fn new(config: Config, store: IssueStore) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    fn build_router(config: &Config, store: IssueStore) -> Router {
        let state = Arc::new(ApiState::new(store));

        let cors = if config.cors_origins.is_empty() {
            // No origins configured: permissive, for development
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(health))
            .nest("/api", issue_routes(state))
            .layer(cors)
    }

    /// The socket address the server will bind.
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// The router (for tests).
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until shutdown.
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}", e)))?;

        let listener = TcpListener::bind(addr).await?;
        let addr_str = addr.to_string();
        Logger::info("SERVER_STARTED", &[("addr", addr_str.as_str())]);

        axum::serve(listener, self.router).await
    }
}

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
