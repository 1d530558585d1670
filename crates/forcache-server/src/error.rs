use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use forcache::CacheError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A branch id in the request did not parse, so no such branch can exist.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Cache(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Cache(CacheError::Conflict { .. } | CacheError::BranchClosed { .. }) => {
                StatusCode::CONFLICT
            }
            Self::BranchNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use forcache::{BranchId, BranchState, Version};

    #[test]
    fn status_mapping() {
        let id = BranchId::new();
        let cases = [
            (ServerError::from(CacheError::KeyNotFound("k".into())), StatusCode::NOT_FOUND),
            (ServerError::from(CacheError::BranchNotFound(id.clone())), StatusCode::NOT_FOUND),
            (ServerError::BranchNotFound("nope".into()), StatusCode::NOT_FOUND),
            (
                ServerError::from(CacheError::Conflict {
                    branch: id.clone(),
                    base: Version::ZERO,
                    current: Version::new(1),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ServerError::from(CacheError::BranchClosed {
                    id,
                    state: BranchState::Rejected,
                }),
                StatusCode::CONFLICT,
            ),
            (ServerError::BadRequest("eof".into()), StatusCode::BAD_REQUEST),
            (ServerError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }
}
