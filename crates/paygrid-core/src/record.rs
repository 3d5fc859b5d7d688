//! Compensation records — the unit of user submission.
//!
//! A record arrives as a [`SubmissionInput`]: the loosely-typed shape a
//! browser form delivers, with every numeric field an optional string.
//! Validation turns it into a [`CompensationRecord`], whose category-specific
//! fields live in the [`CategoryDetails`] tagged union. Records are immutable
//! inputs to aggregation; they are never stored as-is in the bucket table.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ─── Category ────────────────────────────────────────────────────────────────

/// Which aggregation family a record belongs to. Determines the identity-key
/// shape and which optional fields are meaningful.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  #[default]
  FullTime,
  Internship,
  University,
}

impl Category {
  /// The discriminant string stored in the `category` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::FullTime => "full_time",
      Self::Internship => "internship",
      Self::University => "university",
    }
  }
}

/// Whether a University data point describes a full-time or internship offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
  FullTime,
  Internship,
}

impl EmploymentType {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::FullTime => "full_time",
      Self::Internship => "internship",
    }
  }

  /// Parse the free-text form values seen in the wild: "Full-time",
  /// "full_time", "fulltime", "Internship", case-insensitive.
  pub fn parse(s: &str) -> Result<Self, ValidationError> {
    let folded: String = s
      .trim()
      .chars()
      .filter(|c| *c != '-' && *c != '_' && *c != ' ')
      .collect::<String>()
      .to_lowercase();
    match folded.as_str() {
      "fulltime" => Ok(Self::FullTime),
      "internship" => Ok(Self::Internship),
      _ => Err(ValidationError::UnknownEmploymentType(s.to_owned())),
    }
  }
}

// ─── SubmissionInput ─────────────────────────────────────────────────────────

/// The wire form of one compensation record, exactly as submitted.
///
/// All numeric fields are optional strings; parsing happens in
/// [`SubmissionInput::validate`]. Missing string fields deserialise to their
/// defaults so that required-field failures surface as [`ValidationError`]s
/// rather than deserialisation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionInput {
  #[serde(default)]
  pub company:             String,
  #[serde(default)]
  pub role:                String,
  #[serde(default)]
  pub location:            String,
  #[serde(default)]
  pub category:            Category,
  pub total_compensation:  Option<String>,
  /// Only meaningful for FullTime; forced to null for other categories.
  pub years_of_experience: Option<String>,
  pub base_salary:         Option<String>,
  pub bonus:               Option<String>,
  pub stock_compensation:  Option<String>,
  /// Required for University records.
  pub employment_type:     Option<String>,
  /// Internship metadata; not part of any identity key.
  pub duration:            Option<String>,
  pub stipend:             Option<String>,
  /// Required for University records.
  pub university:          Option<String>,
  pub year:                Option<String>,
}

/// Parse an optional numeric string. Blank and unparsable values both become
/// `None` — only `total_compensation` is allowed to fail validation.
fn to_number_or_null(value: Option<&str>) -> Option<f64> {
  let s = value?.trim();
  if s.is_empty() {
    return None;
  }
  s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Trim a required identity string, failing if it comes out empty.
fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    Err(ValidationError::MissingField(field))
  } else {
    Ok(trimmed.to_owned())
  }
}

/// Same, for the optional-string University fields.
fn required_opt(
  field: &'static str,
  value: Option<&str>,
) -> Result<String, ValidationError> {
  required(field, value.unwrap_or(""))
}

impl SubmissionInput {
  /// Validate and parse into a [`CompensationRecord`].
  ///
  /// Fails when company/role/location are blank, when total compensation is
  /// missing, non-numeric, or non-positive, or when a University record is
  /// missing any of university/employment_type/year.
  pub fn validate(&self) -> Result<CompensationRecord, ValidationError> {
    let company = required("company", &self.company)?;
    let role = required("role", &self.role)?;
    let location = required("location", &self.location)?;

    let raw_total = self
      .total_compensation
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or(ValidationError::MissingField("total_compensation"))?;
    let total_compensation = raw_total
      .parse::<f64>()
      .ok()
      .filter(|n| n.is_finite())
      .ok_or_else(|| {
        ValidationError::NonNumericCompensation(raw_total.to_owned())
      })?;
    if total_compensation <= 0.0 {
      return Err(ValidationError::NonPositiveCompensation(total_compensation));
    }

    let details = match self.category {
      Category::FullTime => CategoryDetails::FullTime {
        years_of_experience: to_number_or_null(
          self.years_of_experience.as_deref(),
        ),
      },
      Category::Internship => CategoryDetails::Internship {
        duration: self.duration.clone().filter(|s| !s.trim().is_empty()),
        stipend:  self.stipend.clone().filter(|s| !s.trim().is_empty()),
      },
      Category::University => CategoryDetails::University {
        university:      required_opt("university", self.university.as_deref())?,
        employment_type: EmploymentType::parse(&required_opt(
          "employment_type",
          self.employment_type.as_deref(),
        )?)?,
        year:            required_opt("year", self.year.as_deref())?,
      },
    };

    Ok(CompensationRecord {
      company,
      role,
      location,
      total_compensation,
      base_salary: to_number_or_null(self.base_salary.as_deref()),
      bonus: to_number_or_null(self.bonus.as_deref()).unwrap_or(0.0),
      stock_compensation: to_number_or_null(self.stock_compensation.as_deref())
        .unwrap_or(0.0),
      details,
    })
  }
}

// ─── CategoryDetails ─────────────────────────────────────────────────────────

/// Category-specific payload of a validated record. Each variant carries only
/// the fields meaningful for its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum CategoryDetails {
  FullTime {
    /// `None` is a distinct aggregation bucket, not equal to any number.
    years_of_experience: Option<f64>,
  },
  Internship {
    /// Side metadata; excluded from the identity key.
    duration: Option<String>,
    stipend:  Option<String>,
  },
  University {
    university:      String,
    employment_type: EmploymentType,
    year:            String,
  },
}

// ─── CompensationRecord ──────────────────────────────────────────────────────

/// A validated, immutable data point ready to fold into a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationRecord {
  pub company:            String,
  pub role:               String,
  pub location:           String,
  pub total_compensation: f64,
  /// Breakdown components. `base_salary` stays null when absent; bonus and
  /// stock default to zero.
  pub base_salary:        Option<f64>,
  pub bonus:              f64,
  pub stock_compensation: f64,
  pub details:            CategoryDetails,
}

impl CompensationRecord {
  pub fn category(&self) -> Category {
    match self.details {
      CategoryDetails::FullTime { .. } => Category::FullTime,
      CategoryDetails::Internship { .. } => Category::Internship,
      CategoryDetails::University { .. } => Category::University,
    }
  }

  /// Years of experience, populated only for FullTime records.
  pub fn years_of_experience(&self) -> Option<f64> {
    match self.details {
      CategoryDetails::FullTime { years_of_experience } => years_of_experience,
      _ => None,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
