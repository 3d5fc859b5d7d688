//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The submission input and
//! `additional_data` map are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use paygrid_core::{
  bucket::AggregateBucket,
  comment::Comment,
  moderation::{Submission, SubmissionStatus},
  record::Category,
  vote::VoteKind,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Category ────────────────────────────────────────────────────────────────

pub fn decode_category(s: &str) -> Result<Category> {
  match s {
    "full_time" => Ok(Category::FullTime),
    "internship" => Ok(Category::Internship),
    "university" => Ok(Category::University),
    other => Err(Error::UnknownDiscriminant {
      column: "category",
      value:  other.to_owned(),
    }),
  }
}

// ─── SubmissionStatus ────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "pending" => Ok(SubmissionStatus::Pending),
    "approved" => Ok(SubmissionStatus::Approved),
    "rejected" => Ok(SubmissionStatus::Rejected),
    other => Err(Error::UnknownDiscriminant {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

// ─── VoteKind ────────────────────────────────────────────────────────────────

pub fn decode_vote_kind(s: &str) -> Result<VoteKind> {
  match s {
    "up" => Ok(VoteKind::Up),
    "down" => Ok(VoteKind::Down),
    other => Err(Error::UnknownDiscriminant {
      column: "vote_type",
      value:  other.to_owned(),
    }),
  }
}

// ─── Additional data ─────────────────────────────────────────────────────────

pub fn encode_additional_data(map: &BTreeMap<String, String>) -> Result<String> {
  Ok(serde_json::to_string(map)?)
}

pub fn decode_additional_data(s: &str) -> Result<BTreeMap<String, String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `buckets` row.
pub struct RawBucket {
  pub bucket_id:            String,
  pub created_at:           String,
  pub company:              String,
  pub role:                 String,
  pub location:             String,
  pub category:             String,
  pub years_of_experience:  Option<f64>,
  pub average_compensation: f64,
  pub min_compensation:     f64,
  pub max_compensation:     f64,
  pub data_point_count:     i64,
  pub base_salary:          Option<f64>,
  pub bonus:                f64,
  pub stock_compensation:   f64,
  pub upvotes:              i64,
  pub downvotes:            i64,
  pub additional_data:      String,
}

impl RawBucket {
  /// Column list matching the field order above; shared by every bucket
  /// SELECT so `from_row` indices stay correct.
  pub const COLUMNS: &'static str = "bucket_id, created_at, company, role, \
     location, category, years_of_experience, average_compensation, \
     min_compensation, max_compensation, data_point_count, base_salary, \
     bonus, stock_compensation, upvotes, downvotes, additional_data";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      bucket_id:            row.get(0)?,
      created_at:           row.get(1)?,
      company:              row.get(2)?,
      role:                 row.get(3)?,
      location:             row.get(4)?,
      category:             row.get(5)?,
      years_of_experience:  row.get(6)?,
      average_compensation: row.get(7)?,
      min_compensation:     row.get(8)?,
      max_compensation:     row.get(9)?,
      data_point_count:     row.get(10)?,
      base_salary:          row.get(11)?,
      bonus:                row.get(12)?,
      stock_compensation:   row.get(13)?,
      upvotes:              row.get(14)?,
      downvotes:            row.get(15)?,
      additional_data:      row.get(16)?,
    })
  }

  pub fn into_bucket(self) -> Result<AggregateBucket> {
    Ok(AggregateBucket {
      bucket_id:            decode_uuid(&self.bucket_id)?,
      created_at:           decode_dt(&self.created_at)?,
      company:              self.company,
      role:                 self.role,
      location:             self.location,
      category:             decode_category(&self.category)?,
      years_of_experience:  self.years_of_experience,
      average_compensation: self.average_compensation,
      min_compensation:     self.min_compensation,
      max_compensation:     self.max_compensation,
      data_point_count:     self.data_point_count,
      base_salary:          self.base_salary,
      bonus:                self.bonus,
      stock_compensation:   self.stock_compensation,
      upvotes:              self.upvotes,
      downvotes:            self.downvotes,
      additional_data:      decode_additional_data(&self.additional_data)?,
    })
  }
}

/// Raw values read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id:       String,
  pub input_json:          String,
  pub status:              String,
  pub submitted_at:        String,
  pub reviewed_at:         Option<String>,
  pub reviewed_by:         Option<String>,
  pub rejection_reason:    Option<String>,
  pub published_bucket_id: Option<String>,
}

impl RawSubmission {
  pub const COLUMNS: &'static str = "submission_id, input_json, status, \
     submitted_at, reviewed_at, reviewed_by, rejection_reason, \
     published_bucket_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id:       row.get(0)?,
      input_json:          row.get(1)?,
      status:              row.get(2)?,
      submitted_at:        row.get(3)?,
      reviewed_at:         row.get(4)?,
      reviewed_by:         row.get(5)?,
      rejection_reason:    row.get(6)?,
      published_bucket_id: row.get(7)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id:       decode_uuid(&self.submission_id)?,
      input:               serde_json::from_str(&self.input_json)?,
      status:              decode_status(&self.status)?,
      submitted_at:        decode_dt(&self.submitted_at)?,
      reviewed_at:         self.reviewed_at.as_deref().map(decode_dt).transpose()?,
      reviewed_by:         self.reviewed_by,
      rejection_reason:    self.rejection_reason,
      published_bucket_id: self
        .published_bucket_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
    })
  }
}

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub bucket_id:  String,
  pub parent_id:  Option<String>,
  pub user_id:    Option<String>,
  pub author:     String,
  pub body:       String,
  pub upvotes:    i64,
  pub downvotes:  i64,
  pub created_at: String,
}

impl RawComment {
  pub const COLUMNS: &'static str = "comment_id, bucket_id, parent_id, \
     user_id, author, body, upvotes, downvotes, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      bucket_id:  row.get(1)?,
      parent_id:  row.get(2)?,
      user_id:    row.get(3)?,
      author:     row.get(4)?,
      body:       row.get(5)?,
      upvotes:    row.get(6)?,
      downvotes:  row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      bucket_id:  decode_uuid(&self.bucket_id)?,
      parent_id:  self.parent_id.as_deref().map(decode_uuid).transpose()?,
      user_id:    self.user_id,
      author:     self.author,
      body:       self.body,
      upvotes:    self.upvotes,
      downvotes:  self.downvotes,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
