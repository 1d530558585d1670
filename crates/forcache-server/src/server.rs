use std::sync::Arc;

use forcache::Cache;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::SharedCache;
use crate::router::build_router;

/// HTTP server around one shared cache.
pub struct CacheServer {
    config: ServerConfig,
    cache: SharedCache,
}

impl CacheServer {
    /// Server over a fresh, empty cache.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_cache(config, Arc::new(Cache::new()))
    }

    pub fn with_cache(config: ServerConfig, cache: SharedCache) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let router = build_router(Arc::clone(&self.cache));
        if self.config.enable_tracing_layer {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        }
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("forcache server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
