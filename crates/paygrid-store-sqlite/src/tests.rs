//! Integration tests for `SqliteStore` against an in-memory database.

use paygrid_core::{
  Error,
  aggregate::record_data_point,
  bucket::BucketStats,
  comment::NewComment,
  error::ValidationError,
  moderation::{
    SubmissionStatus, approve_submission, reject_submission, submit_for_review,
  },
  record::{Category, SubmissionInput},
  store::{BucketQuery, BucketSort, CompStore},
  vote::VoteKind,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn fulltime(company: &str, location: &str, total: &str, yoe: Option<&str>) -> SubmissionInput {
  SubmissionInput {
    company: company.into(),
    role: "Engineer".into(),
    location: location.into(),
    category: Category::FullTime,
    total_compensation: Some(total.into()),
    years_of_experience: yoe.map(Into::into),
    ..Default::default()
  }
}

fn internship(company: &str, location: &str, total: &str) -> SubmissionInput {
  SubmissionInput {
    company: company.into(),
    role: "SWE Intern".into(),
    location: location.into(),
    category: Category::Internship,
    total_compensation: Some(total.into()),
    duration: Some("3 months".into()),
    ..Default::default()
  }
}

fn university(company: &str, year: &str, total: &str) -> SubmissionInput {
  SubmissionInput {
    company: company.into(),
    role: "Graduate Engineer".into(),
    location: "Pune".into(),
    category: Category::University,
    total_compensation: Some(total.into()),
    university: Some("IIT Bombay".into()),
    employment_type: Some("Full-time".into()),
    year: Some(year.into()),
    ..Default::default()
  }
}

// ─── Bucket creation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn first_record_seeds_bucket() {
  let s = store().await;

  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "1200000", Some("2")))
    .await
    .unwrap();

  assert_eq!(bucket.data_point_count, 1);
  assert_eq!(bucket.average_compensation, 1_200_000.0);
  assert_eq!(bucket.min_compensation, 1_200_000.0);
  assert_eq!(bucket.max_compensation, 1_200_000.0);
  assert_eq!(bucket.years_of_experience, Some(2.0));
  assert_eq!(bucket.upvotes, 0);

  let fetched = s.get_bucket(bucket.bucket_id).await.unwrap().unwrap();
  assert_eq!(fetched.data_point_count, 1);
  assert_eq!(fetched.company, "Acme");
}

#[tokio::test]
async fn folding_sequence_yields_exact_mean() {
  let s = store().await;

  for total in ["100", "200", "300"] {
    record_data_point(&s, &fulltime("Acme", "Pune", total, Some("2")))
      .await
      .unwrap();
  }

  let all = s.list_buckets(&BucketQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  let bucket = &all[0];
  assert_eq!(bucket.average_compensation, 200.0);
  assert_eq!(bucket.data_point_count, 3);
  assert_eq!(bucket.min_compensation, 100.0);
  assert_eq!(bucket.max_compensation, 300.0);
}

#[tokio::test]
async fn resubmission_is_not_idempotent() {
  let s = store().await;
  let input = fulltime("Acme", "Pune", "500000", None);

  record_data_point(&s, &input).await.unwrap();
  let bucket = record_data_point(&s, &input).await.unwrap();

  // Each call is a genuinely new data point.
  assert_eq!(bucket.data_point_count, 2);
  assert_eq!(bucket.average_compensation, 500_000.0);
}

// ─── Identity partitioning ───────────────────────────────────────────────────

#[tokio::test]
async fn null_experience_is_its_own_bucket() {
  let s = store().await;

  let with_yoe = record_data_point(&s, &fulltime("Acme", "Pune", "100", Some("3")))
    .await
    .unwrap();
  let without = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();

  assert_ne!(with_yoe.bucket_id, without.bucket_id);
  assert_eq!(with_yoe.data_point_count, 1);
  assert_eq!(without.data_point_count, 1);

  // An unparsable experience string also lands in the null bucket.
  let unparsable =
    record_data_point(&s, &fulltime("Acme", "Pune", "100", Some("three")))
      .await
      .unwrap();
  assert_eq!(unparsable.bucket_id, without.bucket_id);
  assert_eq!(unparsable.data_point_count, 2);
}

#[tokio::test]
async fn fulltime_location_partitions_buckets() {
  let s = store().await;

  let pune = record_data_point(&s, &fulltime("Acme", "Pune", "100", Some("1")))
    .await
    .unwrap();
  let mumbai = record_data_point(&s, &fulltime("Acme", "Mumbai", "100", Some("1")))
    .await
    .unwrap();

  assert_ne!(pune.bucket_id, mumbai.bucket_id);
}

#[tokio::test]
async fn internship_key_excludes_location() {
  let s = store().await;

  let first = record_data_point(&s, &internship("Acme", "Pune", "30000"))
    .await
    .unwrap();
  let second = record_data_point(&s, &internship("Acme", "Mumbai", "50000"))
    .await
    .unwrap();

  assert_eq!(first.bucket_id, second.bucket_id);
  assert_eq!(second.data_point_count, 2);
  assert_eq!(second.average_compensation, 40_000.0);
  // Metadata from the first record sticks.
  assert_eq!(
    second.additional_data.get("duration").map(String::as_str),
    Some("3 months")
  );
}

#[tokio::test]
async fn university_year_partitions_buckets() {
  let s = store().await;

  let y2024 = record_data_point(&s, &university("Acme", "2024", "900000"))
    .await
    .unwrap();
  let y2025 = record_data_point(&s, &university("Acme", "2025", "950000"))
    .await
    .unwrap();
  let y2024_again = record_data_point(&s, &university("Acme", "2024", "1100000"))
    .await
    .unwrap();

  assert_ne!(y2024.bucket_id, y2025.bucket_id);
  assert_eq!(y2024.bucket_id, y2024_again.bucket_id);
  assert_eq!(y2024_again.data_point_count, 2);
  assert_eq!(
    y2024_again.additional_data.get("year").map(String::as_str),
    Some("2024")
  );
}

// ─── Validation side effects ─────────────────────────────────────────────────

#[tokio::test]
async fn university_missing_year_rejected_without_side_effects() {
  let s = store().await;
  let mut input = university("Acme", "2024", "900000");
  input.year = None;

  let err = record_data_point(&s, &input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::MissingField("year"))
  ));

  let all = s.list_buckets(&BucketQuery::default()).await.unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn bad_totals_rejected_without_side_effects() {
  let s = store().await;

  let err = record_data_point(&s, &fulltime("Acme", "Pune", "-5", None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::NonPositiveCompensation(_))
  ));

  let err = record_data_point(&s, &fulltime("Acme", "Pune", "abc", None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::NonNumericCompensation(_))
  ));

  let all = s.list_buckets(&BucketQuery::default()).await.unwrap();
  assert!(all.is_empty());
}

// ─── Optimistic concurrency ──────────────────────────────────────────────────

#[tokio::test]
async fn stale_count_update_is_rejected() {
  let s = store().await;
  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();

  let stats = BucketStats { average: 150.0, min: 100.0, max: 200.0, count: 2 };

  // First conditional update wins.
  let updated = s
    .update_bucket_stats(bucket.bucket_id, 1, stats)
    .await
    .unwrap();
  assert_eq!(updated.unwrap().data_point_count, 2);

  // A second writer holding the stale count loses.
  let lost = s
    .update_bucket_stats(bucket.bucket_id, 1, stats)
    .await
    .unwrap();
  assert!(lost.is_none());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_buckets_filters_and_sorts() {
  let s = store().await;
  record_data_point(&s, &fulltime("Acme", "Pune", "100", Some("1")))
    .await
    .unwrap();
  record_data_point(&s, &fulltime("Globex", "Pune", "300", Some("1")))
    .await
    .unwrap();
  record_data_point(&s, &internship("Acme", "Pune", "200"))
    .await
    .unwrap();

  let acme = s
    .list_buckets(&BucketQuery { company: Some("acme".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(acme.len(), 2);
  assert!(acme.iter().all(|b| b.company == "Acme"));

  let internships = s
    .list_buckets(&BucketQuery {
      category: Some(Category::Internship),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(internships.len(), 1);

  let by_average = s
    .list_buckets(&BucketQuery {
      sort: BucketSort::HighestAverage,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_average[0].company, "Globex");
}

// ─── Moderation workflow ─────────────────────────────────────────────────────

#[tokio::test]
async fn submission_approval_folds_exactly_once() {
  let s = store().await;

  let submission =
    submit_for_review(&s, fulltime("Acme", "Pune", "800000", Some("2")))
      .await
      .unwrap();
  assert_eq!(submission.status, SubmissionStatus::Pending);

  // Nothing aggregated while pending.
  assert!(s.list_buckets(&BucketQuery::default()).await.unwrap().is_empty());

  let (approved, bucket) =
    approve_submission(&s, submission.submission_id, "admin@example.com")
      .await
      .unwrap();
  assert_eq!(approved.status, SubmissionStatus::Approved);
  assert_eq!(approved.published_bucket_id, Some(bucket.bucket_id));
  assert_eq!(approved.reviewed_by.as_deref(), Some("admin@example.com"));
  assert_eq!(bucket.data_point_count, 1);

  // Approving twice is an error and does not fold again.
  let err = approve_submission(&s, submission.submission_id, "admin@example.com")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubmissionNotPending(_)));
  let bucket = s.get_bucket(bucket.bucket_id).await.unwrap().unwrap();
  assert_eq!(bucket.data_point_count, 1);
}

#[tokio::test]
async fn concurrent_approvals_fold_exactly_once() {
  let s = store().await;
  let submission =
    submit_for_review(&s, fulltime("Acme", "Pune", "800000", Some("2")))
      .await
      .unwrap();

  // Both reviewers race for the same pending submission; the conditional
  // pending-to-approved claim lets only one of them reach the fold.
  let (a, b) = tokio::join!(
    approve_submission(&s, submission.submission_id, "admin@example.com"),
    approve_submission(&s, submission.submission_id, "mod@example.com"),
  );
  assert!(
    a.is_ok() != b.is_ok(),
    "exactly one approval must win: a={a:?} b={b:?}"
  );
  let loser = if a.is_err() { a } else { b };
  assert!(matches!(loser.unwrap_err(), Error::SubmissionNotPending(_)));

  // One submission contributed exactly one data point to exactly one bucket.
  let all = s.list_buckets(&BucketQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].data_point_count, 1);

  let stored = s
    .get_submission(submission.submission_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.status, SubmissionStatus::Approved);
  assert_eq!(stored.published_bucket_id, Some(all[0].bucket_id));
}

#[tokio::test]
async fn submission_rejection_is_terminal() {
  let s = store().await;
  let submission =
    submit_for_review(&s, fulltime("Acme", "Pune", "800000", None))
      .await
      .unwrap();

  let rejected = reject_submission(
    &s,
    submission.submission_id,
    "admin@example.com",
    Some("duplicate entry".into()),
  )
  .await
  .unwrap();
  assert_eq!(rejected.status, SubmissionStatus::Rejected);
  assert_eq!(rejected.rejection_reason.as_deref(), Some("duplicate entry"));

  // No aggregation happened, and a later approval attempt fails.
  assert!(s.list_buckets(&BucketQuery::default()).await.unwrap().is_empty());
  let err = approve_submission(&s, submission.submission_id, "admin@example.com")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubmissionNotPending(_)));
}

#[tokio::test]
async fn invalid_submission_never_enters_queue() {
  let s = store().await;

  let err = submit_for_review(&s, fulltime("", "Pune", "800000", None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert!(s.list_submissions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn approve_missing_submission_errors() {
  let s = store().await;
  let err = approve_submission(&s, Uuid::new_v4(), "admin@example.com")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubmissionNotFound(_)));
}

#[tokio::test]
async fn list_submissions_filters_by_status() {
  let s = store().await;
  let a = submit_for_review(&s, fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();
  submit_for_review(&s, fulltime("Globex", "Pune", "200", None))
    .await
    .unwrap();
  reject_submission(&s, a.submission_id, "admin@example.com", None)
    .await
    .unwrap();

  let pending = s
    .list_submissions(Some(SubmissionStatus::Pending))
    .await
    .unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].input.company, "Globex");

  let all = s.list_submissions(None).await.unwrap();
  assert_eq!(all.len(), 2);
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vote_lifecycle_maintains_counters() {
  let s = store().await;
  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();
  let id = bucket.bucket_id;

  // Cast.
  let counts = s
    .cast_vote(id, "user-1".into(), VoteKind::Up)
    .await
    .unwrap()
    .unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (1, 0));
  assert_eq!(
    s.get_vote(id, "user-1".into()).await.unwrap(),
    Some(VoteKind::Up)
  );

  // Duplicate cast is refused.
  assert!(s.cast_vote(id, "user-1".into(), VoteKind::Down).await.unwrap().is_none());

  // Change is a replace, not an extra increment.
  let counts = s
    .change_vote(id, "user-1".into(), VoteKind::Down)
    .await
    .unwrap()
    .unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (0, 1));

  // Changing to the same type is a no-op.
  let counts = s
    .change_vote(id, "user-1".into(), VoteKind::Down)
    .await
    .unwrap()
    .unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (0, 1));

  // Removal decrements.
  let counts = s.remove_vote(id, "user-1".into()).await.unwrap().unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (0, 0));
  assert_eq!(s.get_vote(id, "user-1".into()).await.unwrap(), None);

  // Nothing left to remove or change.
  assert!(s.remove_vote(id, "user-1".into()).await.unwrap().is_none());
  assert!(s.change_vote(id, "user-1".into(), VoteKind::Up).await.unwrap().is_none());
}

#[tokio::test]
async fn votes_are_per_user() {
  let s = store().await;
  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();
  let id = bucket.bucket_id;

  s.cast_vote(id, "user-1".into(), VoteKind::Up).await.unwrap();
  s.cast_vote(id, "user-2".into(), VoteKind::Up).await.unwrap();
  s.cast_vote(id, "user-3".into(), VoteKind::Down).await.unwrap();

  let counts = s.vote_counts(id).await.unwrap().unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (2, 1));

  // The aggregation path leaves counters alone.
  record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();
  let counts = s.vote_counts(id).await.unwrap().unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (2, 1));
}

#[tokio::test]
async fn vote_counts_for_missing_bucket_is_none() {
  let s = store().await;
  assert!(s.vote_counts(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_threads_are_one_level_deep() {
  let s = store().await;
  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();

  let top = s
    .add_comment(NewComment {
      bucket_id: bucket.bucket_id,
      parent_id: None,
      user_id:   Some("user-1".into()),
      author:    "Alice".into(),
      body:      "Looks accurate for 2024 offers.".into(),
    })
    .await
    .unwrap()
    .unwrap();

  let reply = s
    .add_comment(NewComment {
      bucket_id: bucket.bucket_id,
      parent_id: Some(top.comment_id),
      user_id:   None,
      author:    "Anonymous".into(),
      body:      "Matches mine too.".into(),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(reply.parent_id, Some(top.comment_id));

  // Replying to a reply is refused.
  let nested = s
    .add_comment(NewComment {
      bucket_id: bucket.bucket_id,
      parent_id: Some(reply.comment_id),
      user_id:   None,
      author:    "Anonymous".into(),
      body:      "Too deep.".into(),
    })
    .await
    .unwrap();
  assert!(nested.is_none());

  let comments = s.list_comments(bucket.bucket_id).await.unwrap();
  assert_eq!(comments.len(), 2);
  assert_eq!(comments[0].comment_id, top.comment_id);
}

#[tokio::test]
async fn comment_on_missing_bucket_or_parent_is_refused() {
  let s = store().await;
  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();

  let orphan = s
    .add_comment(NewComment {
      bucket_id: Uuid::new_v4(),
      parent_id: None,
      user_id:   None,
      author:    "Alice".into(),
      body:      "hello".into(),
    })
    .await
    .unwrap();
  assert!(orphan.is_none());

  let bad_parent = s
    .add_comment(NewComment {
      bucket_id: bucket.bucket_id,
      parent_id: Some(Uuid::new_v4()),
      user_id:   None,
      author:    "Alice".into(),
      body:      "hello".into(),
    })
    .await
    .unwrap();
  assert!(bad_parent.is_none());
}

#[tokio::test]
async fn comment_votes_increment_unconditionally() {
  let s = store().await;
  let bucket = record_data_point(&s, &fulltime("Acme", "Pune", "100", None))
    .await
    .unwrap();
  let comment = s
    .add_comment(NewComment {
      bucket_id: bucket.bucket_id,
      parent_id: None,
      user_id:   None,
      author:    "Alice".into(),
      body:      "hello".into(),
    })
    .await
    .unwrap()
    .unwrap();

  s.vote_comment(comment.comment_id, VoteKind::Up).await.unwrap();
  let counts = s
    .vote_comment(comment.comment_id, VoteKind::Up)
    .await
    .unwrap()
    .unwrap();
  assert_eq!((counts.upvotes, counts.downvotes), (2, 0));

  assert!(s.vote_comment(Uuid::new_v4(), VoteKind::Up).await.unwrap().is_none());
}
