//! Handlers for the Basic-auth reviewer surface under `/admin`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/submissions` | Optional `?status=pending\|approved\|rejected` |
//! | `POST` | `/admin/submissions/:id/approve` | Folds the data point exactly once |
//! | `POST` | `/admin/submissions/:id/reject` | Body: `{"reason":"..."}` (optional) |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use paygrid_core::{
  bucket::AggregateBucket,
  moderation::{
    Submission, SubmissionStatus, approve_submission, reject_submission,
  },
  store::CompStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<SubmissionStatus>,
}

/// `GET /admin/submissions[?status=<status>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(_reviewer): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: CompStore,
{
  let submissions = state
    .store
    .list_submissions(params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(submissions))
}

// ─── Approve ──────────────────────────────────────────────────────────────────

/// The review outcome plus the bucket the data point landed in.
#[derive(Debug, Serialize)]
pub struct ApproveResponse {
  pub submission: Submission,
  pub bucket:     AggregateBucket,
}

/// `POST /admin/submissions/:id/approve`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  Authenticated(reviewer): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<ApproveResponse>, ApiError>
where
  S: CompStore,
{
  let (submission, bucket) =
    approve_submission(state.store.as_ref(), id, &reviewer)
      .await
      .map_err(ApiError::from_core)?;

  tracing::info!(
    submission_id = %id,
    bucket_id = %bucket.bucket_id,
    reviewer = %reviewer,
    "submission approved"
  );

  Ok(Json(ApproveResponse { submission, bucket }))
}

// ─── Reject ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct RejectBody {
  pub reason: Option<String>,
}

/// `POST /admin/submissions/:id/reject` — body: `{"reason":"..."}` (optional).
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  Authenticated(reviewer): Authenticated,
  Path(id): Path<Uuid>,
  body: Option<Json<RejectBody>>,
) -> Result<Json<Submission>, ApiError>
where
  S: CompStore,
{
  let reason = body.map(|Json(b)| b.reason).unwrap_or_default();

  let submission =
    reject_submission(state.store.as_ref(), id, &reviewer, reason)
      .await
      .map_err(ApiError::from_core)?;

  tracing::info!(submission_id = %id, reviewer = %reviewer, "submission rejected");

  Ok(Json(submission))
}
