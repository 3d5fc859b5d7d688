//! Handler for the trusted direct-submission path.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/records` | Body: [`SubmissionInput`]; folds immediately, bypassing moderation |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use paygrid_core::{aggregate::record_data_point, record::SubmissionInput, store::CompStore};

use crate::{AppState, error::ApiError};

/// `POST /records` — returns 201 + the post-fold
/// [`AggregateBucket`](paygrid_core::bucket::AggregateBucket).
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(input): Json<SubmissionInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CompStore,
{
  let bucket = record_data_point(state.store.as_ref(), &input)
    .await
    .map_err(ApiError::from_core)?;
  Ok((StatusCode::CREATED, Json(bucket)))
}
