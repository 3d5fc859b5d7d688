//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a core-level aggregation/moderation error onto an HTTP status.
  pub fn from_core(e: paygrid_core::Error) -> Self {
    use paygrid_core::Error as E;
    match e {
      E::Validation(v) => ApiError::BadRequest(v.to_string()),
      E::SubmissionNotFound(id) => {
        ApiError::NotFound(format!("submission {id} not found"))
      }
      E::SubmissionNotPending(id) => {
        ApiError::Conflict(format!("submission {id} has already been reviewed"))
      }
      E::StatsConflict => ApiError::Conflict(e.to_string()),
      E::Aggregation(a) => ApiError::Store(Box::new(a)),
    }
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthorized => {
        return (
          StatusCode::UNAUTHORIZED,
          [(header::WWW_AUTHENTICATE, "Basic realm=\"paygrid\"")],
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
