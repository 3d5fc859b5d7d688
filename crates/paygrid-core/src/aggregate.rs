//! The aggregation service: fold one submission into its bucket.
//!
//! The service holds no state between calls; the bucket is externally-owned
//! and reached only through the [`CompStore`] operations. Each call is a
//! single synchronous read-fold-write with no internal parallelism.

use tracing::debug;

use crate::{
  Error, Result,
  bucket::{AggregateBucket, IdentityKey, NewBucket, PriorStats},
  error::AggregationError,
  record::SubmissionInput,
  store::CompStore,
};

/// Upper bound on optimistic-concurrency retries. Conflicts mean another
/// fold updated the bucket between our read and conditional write; store
/// I/O failures are never retried.
const MAX_FOLD_ATTEMPTS: u32 = 3;

/// Validate `input` and fold it into the bucket its identity key resolves
/// to, creating the bucket if this is the first data point for the key.
///
/// Deliberately not idempotent: every call is a genuinely new data point and
/// increments the bucket's count.
pub async fn record_data_point<S>(
  store: &S,
  input: &SubmissionInput,
) -> Result<AggregateBucket>
where
  S: CompStore,
{
  let record = input.validate()?;
  let key = IdentityKey::for_record(&record);

  for attempt in 0..MAX_FOLD_ATTEMPTS {
    let existing = store
      .find_latest_bucket(&key)
      .await
      .map_err(AggregationError::new)?;

    let Some(bucket) = existing else {
      let created = store
        .create_bucket(NewBucket::from_record(&record))
        .await
        .map_err(AggregationError::new)?;
      debug!(
        bucket_id = %created.bucket_id,
        company = %created.company,
        role = %created.role,
        "created bucket for first data point"
      );
      return Ok(created);
    };

    let stats =
      PriorStats::from_bucket(&bucket).fold(record.total_compensation);

    let updated = store
      .update_bucket_stats(bucket.bucket_id, bucket.data_point_count, stats)
      .await
      .map_err(AggregationError::new)?;

    match updated {
      Some(bucket) => return Ok(bucket),
      // Count moved underneath us; re-read and re-fold.
      None => {
        debug!(
          bucket_id = %bucket.bucket_id,
          attempt,
          "fold lost optimistic race, retrying"
        );
      }
    }
  }

  Err(Error::StatsConflict)
}
