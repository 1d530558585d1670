use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use forcache::{BranchId, BranchInfo, Cache, QueryOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};

/// The cache every handler works against.
pub type SharedCache = Arc<Cache<Value>>;

/// Body of `PUT /spec/:key`. A missing `value` stages JSON `null`.
#[derive(Debug, Deserialize)]
pub struct PutSpecRequest {
    #[serde(default)]
    pub value: Value,
}

impl PutSpecRequest {
    /// Parse a request body regardless of its declared content type.
    pub fn from_body(body: &[u8]) -> ServerResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ServerError::BadRequest(format!("invalid json: {e}")))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutSpecResponse {
    pub branch_id: BranchId,
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    pub branch: Option<String>,
}

fn parse_branch(raw: &str) -> ServerResult<BranchId> {
    raw.parse()
        .map_err(|_| ServerError::BranchNotFound(raw.to_string()))
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(cache): State<SharedCache>) -> Json<Value> {
    let stats = cache.stats();
    Json(json!({
        "name": "forcache-server",
        "version": env!("CARGO_PKG_VERSION"),
        "confirmed_version": stats.version,
        "confirmed_keys": stats.confirmed_keys,
        "active_branches": stats.active_branches,
    }))
}

/// `PUT /spec/:key`: open a new branch holding one value, or stage into the
/// branch named by `?branch=`.
pub async fn put_spec_handler(
    State(cache): State<SharedCache>,
    Path(key): Path<String>,
    Query(query): Query<BranchQuery>,
    body: Bytes,
) -> ServerResult<Json<PutSpecResponse>> {
    let req = PutSpecRequest::from_body(&body)?;
    let branch_id = match query.branch.as_deref() {
        Some(raw) => {
            let id = parse_branch(raw)?;
            cache.stage(&id, key, req.value)?;
            id
        }
        None => cache.put_speculative(key, req.value),
    };
    Ok(Json(PutSpecResponse { branch_id }))
}

/// `GET /value/:key`. An unknown or malformed branch reads confirmed state.
pub async fn get_value_handler(
    State(cache): State<SharedCache>,
    Path(key): Path<String>,
    Query(query): Query<BranchQuery>,
) -> ServerResult<Json<Value>> {
    let opts = QueryOptions {
        branch: query.branch.as_deref().and_then(|raw| raw.parse().ok()),
    };
    let value = cache.get(&key, &opts)?;
    Ok(Json(json!({ "key": key, "value": value })))
}

pub async fn commit_handler(
    State(cache): State<SharedCache>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    cache.commit(&parse_branch(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rollback_handler(
    State(cache): State<SharedCache>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    cache.rollback(&parse_branch(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn branch_handler(
    State(cache): State<SharedCache>,
    Path(id): Path<String>,
) -> ServerResult<Json<BranchInfo>> {
    Ok(Json(cache.branch_info(&parse_branch(&id)?)?))
}
