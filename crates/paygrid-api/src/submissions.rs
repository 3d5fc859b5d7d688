//! Handler for moderated submission intake.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submissions` | Body: [`SubmissionInput`]; held as `pending` until reviewed |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use paygrid_core::{
  moderation::submit_for_review, record::SubmissionInput, store::CompStore,
};

use crate::{AppState, error::ApiError};

/// `POST /submissions` — returns 201 + the pending
/// [`Submission`](paygrid_core::moderation::Submission). Validation failures
/// are rejected here so reviewers never see junk rows.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(input): Json<SubmissionInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CompStore,
{
  let submission = submit_for_review(state.store.as_ref(), input)
    .await
    .map_err(ApiError::from_core)?;
  Ok((StatusCode::CREATED, Json(submission)))
}
