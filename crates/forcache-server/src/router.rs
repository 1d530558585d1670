use axum::routing::{get, post, put};
use axum::Router;

use crate::handler::{self, SharedCache};

/// Build the axum router with all cache endpoints.
pub fn build_router(cache: SharedCache) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/spec/:key", put(handler::put_spec_handler))
        .route("/value/:key", get(handler::get_value_handler))
        .route("/commit/:id", post(handler::commit_handler))
        .route("/rollback/:id", post(handler::rollback_handler))
        .route("/branch/:id", get(handler::branch_handler))
        .with_state(cache)
}
