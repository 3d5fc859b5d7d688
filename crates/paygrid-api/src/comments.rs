//! Handlers for bucket comment threads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/buckets/:id/comments` | All comments, oldest first |
//! | `POST` | `/buckets/:id/comments` | Body: [`CommentBody`]; one reply level |
//! | `POST` | `/comments/:id/vote` | Body: `{"vote_type":"up"}`; plain increment |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use paygrid_core::{
  comment::{Comment, NewComment},
  store::CompStore,
  vote::{VoteCounts, VoteKind},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /buckets/:id/comments`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: CompStore,
{
  state
    .store
    .get_bucket(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("bucket {id} not found")))?;

  let comments = state
    .store
    .list_comments(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comments))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /buckets/:id/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub parent_id: Option<Uuid>,
  /// Absent means anonymous.
  pub user_id:   Option<String>,
  pub author:    String,
  pub body:      String,
}

/// `POST /buckets/:id/comments` — returns 201 + the stored comment.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CompStore,
{
  state
    .store
    .get_bucket(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("bucket {id} not found")))?;

  let comment = state
    .store
    .add_comment(NewComment {
      bucket_id: id,
      parent_id: body.parent_id,
      user_id:   body.user_id,
      author:    body.author,
      body:      body.body,
    })
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::BadRequest(
        "parent comment not found, or replies cannot be nested".into(),
      )
    })?;

  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Vote ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentVoteBody {
  pub vote_type: VoteKind,
}

/// `POST /comments/:id/vote` — body: `{"vote_type":"up"}`.
pub async fn vote<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CommentVoteBody>,
) -> Result<Json<VoteCounts>, ApiError>
where
  S: CompStore,
{
  let counts = state
    .store
    .vote_comment(id, body.vote_type)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(counts))
}
