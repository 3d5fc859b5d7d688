//! Error types for `paygrid-core`.

use thiserror::Error;
use uuid::Uuid;

/// A submitted record failed the required-field or numeric checks.
///
/// Never retried; the message is safe to surface to the submitter verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("total compensation is not a number: {0:?}")]
  NonNumericCompensation(String),

  #[error("total compensation must be positive (got {0})")]
  NonPositiveCompensation(f64),

  #[error("unknown employment type: {0:?}")]
  UnknownEmploymentType(String),
}

/// An underlying store operation (lookup, insert, or update) failed while
/// folding a data point. At most one attempt per store operation is made;
/// the caller decides whether to retry the whole submission.
#[derive(Debug, Error)]
#[error("aggregation store operation failed: {0}")]
pub struct AggregationError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl AggregationError {
  pub fn new(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self(Box::new(cause))
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Aggregation(#[from] AggregationError),

  /// The bucket's data-point count moved underneath every fold attempt.
  #[error("bucket was concurrently modified; fold retries exhausted")]
  StatsConflict,

  #[error("submission not found: {0}")]
  SubmissionNotFound(Uuid),

  #[error("submission {0} has already been reviewed")]
  SubmissionNotPending(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
