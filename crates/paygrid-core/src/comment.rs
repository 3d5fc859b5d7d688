//! Comment threads attached to aggregate buckets.
//!
//! Threads are flat with a single level of replies: a reply's `parent_id`
//! must point at a top-level comment. Comment vote counters are plain
//! increments — no per-user vote identity is tracked for comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored comment (top-level when `parent_id` is `None`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub bucket_id:  Uuid,
  pub parent_id:  Option<Uuid>,
  /// Absent for anonymous comments.
  pub user_id:    Option<String>,
  pub author:     String,
  pub body:       String,
  pub upvotes:    i64,
  pub downvotes:  i64,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CompStore::add_comment`]. `comment_id`,
/// `created_at`, and the zeroed counters are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
  pub bucket_id: Uuid,
  pub parent_id: Option<Uuid>,
  pub user_id:   Option<String>,
  pub author:    String,
  pub body:      String,
}
