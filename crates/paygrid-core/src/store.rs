//! The `CompStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `paygrid-store-sqlite`). Higher layers (`paygrid-api`, the aggregation
//! service) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  bucket::{AggregateBucket, BucketStats, IdentityKey, NewBucket},
  comment::{Comment, NewComment},
  moderation::{Submission, SubmissionStatus},
  record::{Category, SubmissionInput},
  vote::{VoteCounts, VoteKind},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Sort order for [`CompStore::list_buckets`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BucketSort {
  /// Most recently created first.
  #[default]
  Newest,
  HighestAverage,
  MostDataPoints,
}

/// Parameters for [`CompStore::list_buckets`].
#[derive(Debug, Clone, Default)]
pub struct BucketQuery {
  /// Case-insensitive substring filters.
  pub company:  Option<String>,
  pub role:     Option<String>,
  pub location: Option<String>,
  pub category: Option<Category>,
  pub sort:     BucketSort,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Paygrid storage backend.
///
/// Outcomes that the HTTP layer must distinguish (missing rows, failed
/// conditional updates, duplicate votes) are expressed as `Option` in the
/// success type; `Self::Error` is reserved for genuine store failures.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CompStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Buckets ───────────────────────────────────────────────────────────

  /// The most recently created bucket matching `key`, if any. When multiple
  /// buckets exist for one key (a historical create race), the newest is
  /// authoritative.
  fn find_latest_bucket<'a>(
    &'a self,
    key: &'a IdentityKey,
  ) -> impl Future<Output = Result<Option<AggregateBucket>, Self::Error>> + Send + 'a;

  /// Create a bucket seeded with its first data point
  /// (`data_point_count = 1`, average = min = max = the seed value).
  fn create_bucket(
    &self,
    new: NewBucket,
  ) -> impl Future<Output = Result<AggregateBucket, Self::Error>> + Send + '_;

  /// Atomically persist folded statistics, conditional on the stored
  /// `data_point_count` still being `expected_count`.
  ///
  /// Returns `None` when the condition fails (another fold won the race);
  /// the caller re-reads and re-folds.
  fn update_bucket_stats(
    &self,
    bucket_id: Uuid,
    expected_count: i64,
    stats: BucketStats,
  ) -> impl Future<Output = Result<Option<AggregateBucket>, Self::Error>> + Send + '_;

  /// Retrieve a bucket by id. Returns `None` if not found.
  fn get_bucket(
    &self,
    bucket_id: Uuid,
  ) -> impl Future<Output = Result<Option<AggregateBucket>, Self::Error>> + Send + '_;

  /// Filtered, sorted, paginated bucket listing.
  fn list_buckets<'a>(
    &'a self,
    query: &'a BucketQuery,
  ) -> impl Future<Output = Result<Vec<AggregateBucket>, Self::Error>> + Send + 'a;

  // ── Submissions (moderation gate) ─────────────────────────────────────

  /// Persist a submission in `Pending` state. `submitted_at` is set by the
  /// store.
  fn create_submission(
    &self,
    input: SubmissionInput,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  fn get_submission(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  fn list_submissions(
    &self,
    status: Option<SubmissionStatus>,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Atomically claim a `Pending` submission as `Approved`, recording the
  /// reviewer. The transition is conditional on the stored status still
  /// being pending, so concurrent approvals resolve to exactly one winner.
  /// Returns `None` if the submission is missing or no longer pending.
  fn mark_approved(
    &self,
    submission_id: Uuid,
    reviewer: String,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Record the bucket an approved submission's data point was folded into.
  /// Returns `None` if the submission is missing or not approved.
  fn set_published_bucket(
    &self,
    submission_id: Uuid,
    bucket_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Transition a `Pending` submission to the terminal `Rejected` state.
  /// Returns `None` if the submission is missing or no longer pending.
  fn mark_rejected(
    &self,
    submission_id: Uuid,
    reviewer: String,
    reason: Option<String>,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// The voter's current vote on a bucket, if any.
  fn get_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
  ) -> impl Future<Output = Result<Option<VoteKind>, Self::Error>> + Send + '_;

  /// Record a new vote and bump the matching counter in one transaction.
  /// Returns `None` if the voter has already voted on this bucket.
  fn cast_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
    kind: VoteKind,
  ) -> impl Future<Output = Result<Option<VoteCounts>, Self::Error>> + Send + '_;

  /// Replace an existing vote's type, adjusting both counters in one
  /// transaction. Changing to the same type is a no-op. Returns `None` if
  /// the voter has no existing vote.
  fn change_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
    kind: VoteKind,
  ) -> impl Future<Output = Result<Option<VoteCounts>, Self::Error>> + Send + '_;

  /// Delete the voter's vote and decrement the matching counter. Returns
  /// `None` if there is no vote to remove.
  fn remove_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
  ) -> impl Future<Output = Result<Option<VoteCounts>, Self::Error>> + Send + '_;

  /// Current counters for a bucket. Returns `None` if the bucket is missing.
  fn vote_counts(
    &self,
    bucket_id: Uuid,
  ) -> impl Future<Output = Result<Option<VoteCounts>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Store a comment. Returns `None` when the bucket does not exist, the
  /// parent comment does not exist, or the parent is itself a reply
  /// (threads are one level deep).
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// All comments for a bucket, oldest first.
  fn list_comments(
    &self,
    bucket_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Unconditionally bump a comment's vote counter. Returns `None` if the
  /// comment is missing.
  fn vote_comment(
    &self,
    comment_id: Uuid,
    kind: VoteKind,
  ) -> impl Future<Output = Result<Option<VoteCounts>, Self::Error>> + Send + '_;
}
