//! The moderation gate: pending → approved/rejected submission workflow.
//!
//! A submission is held as `Pending` until a reviewer approves it (exactly
//! one [`record_data_point`] call) or rejects it (terminal, no aggregation).
//! The aggregation service remains directly invokable for trusted flows;
//! both paths share the identical contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::record_data_point,
  bucket::AggregateBucket,
  error::AggregationError,
  record::SubmissionInput,
  store::CompStore,
};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Pending,
  Approved,
  Rejected,
}

impl SubmissionStatus {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

/// A held submission and its review outcome, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id:       Uuid,
  /// The raw input as submitted; re-validated at approval time.
  pub input:               SubmissionInput,
  pub status:              SubmissionStatus,
  pub submitted_at:        DateTime<Utc>,
  pub reviewed_at:         Option<DateTime<Utc>>,
  pub reviewed_by:         Option<String>,
  pub rejection_reason:    Option<String>,
  /// Set on approval: the bucket the data point was folded into.
  pub published_bucket_id: Option<Uuid>,
}

// ─── Workflow operations ─────────────────────────────────────────────────────

/// Hold a submission for review.
///
/// The input is validated eagerly so obviously-bad submissions never reach a
/// reviewer's queue; the stored input stays in its raw form and is validated
/// again when the approval path folds it.
pub async fn submit_for_review<S>(
  store: &S,
  input: SubmissionInput,
) -> Result<Submission>
where
  S: CompStore,
{
  input.validate()?;
  store
    .create_submission(input)
    .await
    .map_err(|e| AggregationError::new(e).into())
}

/// Approve a pending submission: claim it, fold its data point exactly once,
/// then record the published bucket id.
///
/// The claim (`mark_approved`) is a conditional pending-to-approved
/// transition, so of two concurrent approvals only the winner reaches the
/// fold; the loser fails with [`Error::SubmissionNotPending`] and leaves no
/// side effects. Validation runs before the claim so a bad stored input
/// keeps the submission pending.
pub async fn approve_submission<S>(
  store: &S,
  submission_id: Uuid,
  reviewer: &str,
) -> Result<(Submission, AggregateBucket)>
where
  S: CompStore,
{
  let submission = store
    .get_submission(submission_id)
    .await
    .map_err(AggregationError::new)?
    .ok_or(Error::SubmissionNotFound(submission_id))?;

  if submission.status != SubmissionStatus::Pending {
    return Err(Error::SubmissionNotPending(submission_id));
  }
  submission.input.validate()?;

  let claimed = store
    .mark_approved(submission_id, reviewer.to_owned())
    .await
    .map_err(AggregationError::new)?
    .ok_or(Error::SubmissionNotPending(submission_id))?;

  let bucket = record_data_point(store, &claimed.input).await?;

  let approved = store
    .set_published_bucket(submission_id, bucket.bucket_id)
    .await
    .map_err(AggregationError::new)?
    .ok_or(Error::SubmissionNotPending(submission_id))?;

  Ok((approved, bucket))
}

/// Reject a pending submission with an optional free-text reason. Terminal;
/// no aggregation call is made.
pub async fn reject_submission<S>(
  store: &S,
  submission_id: Uuid,
  reviewer: &str,
  reason: Option<String>,
) -> Result<Submission>
where
  S: CompStore,
{
  let submission = store
    .get_submission(submission_id)
    .await
    .map_err(AggregationError::new)?
    .ok_or(Error::SubmissionNotFound(submission_id))?;

  if submission.status != SubmissionStatus::Pending {
    return Err(Error::SubmissionNotPending(submission_id));
  }

  store
    .mark_rejected(submission_id, reviewer.to_owned(), reason)
    .await
    .map_err(AggregationError::new)?
    .ok_or(Error::SubmissionNotPending(submission_id))
}
