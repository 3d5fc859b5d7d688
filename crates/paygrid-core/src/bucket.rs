//! Aggregate buckets and the online-statistics fold.
//!
//! A bucket is the persisted aggregate row for all data points sharing one
//! identity key. It is created by the first record for that key and mutated
//! (count, mean, min, max) by every later fold; the aggregation path never
//! deletes a bucket.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{
  Category, CategoryDetails, CompensationRecord, EmploymentType,
};

// ─── AggregateBucket ─────────────────────────────────────────────────────────

/// The persisted aggregate for one identity key.
///
/// `upvotes`/`downvotes` are maintained exclusively by the vote operations;
/// the aggregation path neither reads nor writes them. `additional_data` and
/// the breakdown snapshot are written once at creation and never updated by
/// later folds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateBucket {
  pub bucket_id:            Uuid,
  pub created_at:           DateTime<Utc>,

  // identity
  pub company:              String,
  pub role:                 String,
  pub location:             String,
  pub category:             Category,
  pub years_of_experience:  Option<f64>,

  // running statistics
  pub average_compensation: f64,
  pub min_compensation:     f64,
  pub max_compensation:     f64,
  pub data_point_count:     i64,

  // breakdown snapshot from the first record
  pub base_salary:          Option<f64>,
  pub bonus:                f64,
  pub stock_compensation:   f64,

  // vote counters
  pub upvotes:              i64,
  pub downvotes:            i64,

  /// Category-specific metadata: university/employment_type/year for
  /// University buckets, duration/stipend for Internship buckets.
  pub additional_data:      BTreeMap<String, String>,
}

// ─── NewBucket ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::CompStore::create_bucket`] — the initial state of
/// a bucket seeded with its first data point. `bucket_id` and `created_at`
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBucket {
  pub company:             String,
  pub role:                String,
  pub location:            String,
  pub category:            Category,
  pub years_of_experience: Option<f64>,
  pub total_compensation:  f64,
  pub base_salary:         Option<f64>,
  pub bonus:               f64,
  pub stock_compensation:  f64,
  pub additional_data:     BTreeMap<String, String>,
}

impl NewBucket {
  /// Seed a fresh bucket from the first record for its identity key.
  pub fn from_record(record: &CompensationRecord) -> Self {
    let mut additional_data = BTreeMap::new();
    match &record.details {
      CategoryDetails::FullTime { .. } => {}
      CategoryDetails::Internship { duration, stipend } => {
        if let Some(d) = duration {
          additional_data.insert("duration".to_owned(), d.clone());
        }
        if let Some(s) = stipend {
          additional_data.insert("stipend".to_owned(), s.clone());
        }
      }
      CategoryDetails::University { university, employment_type, year } => {
        additional_data.insert("university".to_owned(), university.clone());
        additional_data.insert(
          "employment_type".to_owned(),
          employment_type.discriminant().to_owned(),
        );
        additional_data.insert("year".to_owned(), year.clone());
      }
    }

    Self {
      company: record.company.clone(),
      role: record.role.clone(),
      location: record.location.clone(),
      category: record.category(),
      years_of_experience: record.years_of_experience(),
      total_compensation: record.total_compensation,
      base_salary: record.base_salary,
      bonus: record.bonus,
      stock_compensation: record.stock_compensation,
      additional_data,
    }
  }
}

// ─── IdentityKey ─────────────────────────────────────────────────────────────

/// The category-dependent tuple that determines which bucket a record folds
/// into. Implemented as a match over the record's category tag.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityKey {
  /// FullTime buckets are keyed per location and per years-of-experience;
  /// `None` experience is its own bucket, never equal to a numeric value.
  FullTime {
    company:             String,
    role:                String,
    location:            String,
    years_of_experience: Option<f64>,
  },
  /// Internship buckets span all locations and durations for a company/role.
  Internship { company: String, role: String },
  /// University buckets are keyed by the normalized (trimmed) university,
  /// employment type, and year strings.
  University {
    company:         String,
    role:            String,
    university:      String,
    employment_type: EmploymentType,
    year:            String,
  },
}

impl IdentityKey {
  pub fn for_record(record: &CompensationRecord) -> Self {
    match &record.details {
      CategoryDetails::FullTime { years_of_experience } => Self::FullTime {
        company:             record.company.clone(),
        role:                record.role.clone(),
        location:            record.location.clone(),
        years_of_experience: *years_of_experience,
      },
      CategoryDetails::Internship { .. } => Self::Internship {
        company: record.company.clone(),
        role:    record.role.clone(),
      },
      CategoryDetails::University { university, employment_type, year } => {
        Self::University {
          company:         record.company.clone(),
          role:            record.role.clone(),
          university:      university.clone(),
          employment_type: *employment_type,
          year:            year.clone(),
        }
      }
    }
  }

  pub fn category(&self) -> Category {
    match self {
      Self::FullTime { .. } => Category::FullTime,
      Self::Internship { .. } => Category::Internship,
      Self::University { .. } => Category::University,
    }
  }
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// The statistics written back by one fold, persisted as a single atomic
/// conditional update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketStats {
  pub average: f64,
  pub min:     f64,
  pub max:     f64,
  pub count:   i64,
}

/// The legacy-tolerant statistics read back from the store before a fold.
///
/// Rows written by earlier schema generations may lack the mean or min/max
/// fields; the fold falls back to the stored total compensation, and to the
/// incoming value as a last resort.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriorStats {
  pub average:            Option<f64>,
  pub min:                Option<f64>,
  pub max:                Option<f64>,
  pub count:              Option<i64>,
  pub total_compensation: Option<f64>,
}

impl PriorStats {
  pub fn from_bucket(bucket: &AggregateBucket) -> Self {
    Self {
      average:            Some(bucket.average_compensation),
      min:                Some(bucket.min_compensation),
      max:                Some(bucket.max_compensation),
      count:              Some(bucket.data_point_count),
      total_compensation: Some(bucket.total_compensation()),
    }
  }

  /// Fold one new data point into the running statistics.
  ///
  /// Online mean: uses only the previous average and count, never the full
  /// history. A missing or zero prior count is treated as one so a malformed
  /// row still produces a sane mean.
  pub fn fold(&self, value: f64) -> BucketStats {
    let safe_old_count = self.count.unwrap_or(0).max(1);
    let base = self
      .average
      .or(self.total_compensation)
      .unwrap_or(value);

    let count = safe_old_count + 1;
    let average = (base * safe_old_count as f64 + value) / count as f64;
    let min = self.min.unwrap_or(base).min(value);
    let max = self.max.unwrap_or(base).max(value);

    BucketStats { average, min, max, count }
  }
}

impl AggregateBucket {
  /// The mean doubles as the bucket's headline total-compensation figure.
  pub fn total_compensation(&self) -> f64 { self.average_compensation }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
