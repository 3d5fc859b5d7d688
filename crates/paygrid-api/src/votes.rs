//! Handlers for `/buckets/:id/vote`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/buckets/:id/vote` | Counters; caller's vote when `?voter_id=` supplied |
//! | `POST`   | `/buckets/:id/vote` | Cast; 409 if the voter already voted |
//! | `PUT`    | `/buckets/:id/vote` | Replace vote type; 404 if no existing vote |
//! | `DELETE` | `/buckets/:id/vote?voter_id=` | Remove; 404 if no vote |
//!
//! Voter identity is caller-supplied — session management is out of scope.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use paygrid_core::{
  store::CompStore,
  vote::{VoteCounts, VoteKind},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Counters plus the requesting voter's own vote, if known.
#[derive(Debug, Serialize)]
pub struct VoteStatus {
  pub user_vote: Option<VoteKind>,
  pub upvotes:   i64,
  pub downvotes: i64,
}

impl VoteStatus {
  fn new(user_vote: Option<VoteKind>, counts: VoteCounts) -> Self {
    Self {
      user_vote,
      upvotes: counts.upvotes,
      downvotes: counts.downvotes,
    }
  }
}

fn bucket_not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("bucket {id} not found"))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct StatusParams {
  pub voter_id: Option<String>,
}

/// `GET /buckets/:id/vote[?voter_id=...]`
pub async fn status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<StatusParams>,
) -> Result<Json<VoteStatus>, ApiError>
where
  S: CompStore,
{
  let counts = state
    .store
    .vote_counts(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| bucket_not_found(id))?;

  let user_vote = match params.voter_id {
    Some(voter) => state
      .store
      .get_vote(id, voter)
      .await
      .map_err(ApiError::store)?,
    None => None,
  };

  Ok(Json(VoteStatus::new(user_vote, counts)))
}

// ─── Cast ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub voter_id:  String,
  pub vote_type: VoteKind,
}

/// `POST /buckets/:id/vote` — body: `{"voter_id":"...","vote_type":"up"}`
pub async fn cast<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<VoteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CompStore,
{
  // Distinguish a missing bucket (404) from a duplicate vote (409).
  state
    .store
    .vote_counts(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| bucket_not_found(id))?;

  let counts = state
    .store
    .cast_vote(id, body.voter_id, body.vote_type)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::Conflict(
        "already voted on this bucket; use PUT to change or DELETE to remove"
          .into(),
      )
    })?;

  Ok((
    StatusCode::CREATED,
    Json(VoteStatus::new(Some(body.vote_type), counts)),
  ))
}

// ─── Change ───────────────────────────────────────────────────────────────────

/// `PUT /buckets/:id/vote` — replace the existing vote's type.
pub async fn change<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<VoteBody>,
) -> Result<Json<VoteStatus>, ApiError>
where
  S: CompStore,
{
  state
    .store
    .vote_counts(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| bucket_not_found(id))?;

  let counts = state
    .store
    .change_vote(id, body.voter_id, body.vote_type)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound("no existing vote; use POST to cast one".into())
    })?;

  Ok(Json(VoteStatus::new(Some(body.vote_type), counts)))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RemoveParams {
  pub voter_id: String,
}

/// `DELETE /buckets/:id/vote?voter_id=...`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<RemoveParams>,
) -> Result<Json<VoteStatus>, ApiError>
where
  S: CompStore,
{
  state
    .store
    .vote_counts(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| bucket_not_found(id))?;

  let counts = state
    .store
    .remove_vote(id, params.voter_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no vote to remove".into()))?;

  Ok(Json(VoteStatus::new(None, counts)))
}
