//! Handlers for `/buckets` read endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/buckets` | Filter/sort/paginate params map onto [`BucketQuery`] |
//! | `GET`  | `/buckets/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use paygrid_core::{
  bucket::AggregateBucket,
  record::Category,
  store::{BucketQuery, BucketSort, CompStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive substring filters.
  pub company:  Option<String>,
  pub role:     Option<String>,
  pub location: Option<String>,
  pub category: Option<Category>,
  pub sort:     Option<BucketSort>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /buckets[?company=...][&role=...][&category=...][&sort=...][&limit=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AggregateBucket>>, ApiError>
where
  S: CompStore,
{
  let query = BucketQuery {
    company:  params.company,
    role:     params.role,
    location: params.location,
    category: params.category,
    sort:     params.sort.unwrap_or_default(),
    limit:    params.limit,
    offset:   params.offset,
  };

  let buckets = state
    .store
    .list_buckets(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(buckets))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /buckets/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<AggregateBucket>, ApiError>
where
  S: CompStore,
{
  let bucket = state
    .store
    .get_bucket(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("bucket {id} not found")))?;
  Ok(Json(bucket))
}
