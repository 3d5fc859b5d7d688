//! [`SqliteStore`] — the SQLite implementation of [`CompStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use paygrid_core::{
  bucket::{AggregateBucket, BucketStats, IdentityKey, NewBucket},
  comment::{Comment, NewComment},
  moderation::{Submission, SubmissionStatus},
  record::SubmissionInput,
  store::{BucketQuery, BucketSort, CompStore},
  vote::{VoteCounts, VoteKind, counter_delta},
};

use crate::{
  Error, Result,
  encode::{
    RawBucket, RawComment, RawSubmission, decode_vote_kind,
    encode_additional_data, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Paygrid compensation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto one connection, so a multi-statement closure executes
/// atomically with respect to every other operation on this store.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one bucket row by id on an already-held connection.
  fn bucket_row(
    conn: &rusqlite::Connection,
    id_str: &str,
  ) -> rusqlite::Result<Option<RawBucket>> {
    conn
      .query_row(
        &format!(
          "SELECT {} FROM buckets WHERE bucket_id = ?1",
          RawBucket::COLUMNS
        ),
        rusqlite::params![id_str],
        RawBucket::from_row,
      )
      .optional()
  }

  fn counters_row(
    conn: &rusqlite::Connection,
    id_str: &str,
  ) -> rusqlite::Result<Option<(i64, i64)>> {
    conn
      .query_row(
        "SELECT upvotes, downvotes FROM buckets WHERE bucket_id = ?1",
        rusqlite::params![id_str],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
  }
}

// ─── CompStore impl ──────────────────────────────────────────────────────────

impl CompStore for SqliteStore {
  type Error = Error;

  // ── Buckets ───────────────────────────────────────────────────────────────

  async fn find_latest_bucket(
    &self,
    key: &IdentityKey,
  ) -> Result<Option<AggregateBucket>> {
    let key = key.clone();

    let raw: Option<RawBucket> = self
      .conn
      .call(move |conn| {
        let base = format!(
          "SELECT {} FROM buckets WHERE company = ?1 AND role = ?2",
          RawBucket::COLUMNS
        );
        let tail = "ORDER BY created_at DESC LIMIT 1";

        let row = match key {
          IdentityKey::FullTime {
            company,
            role,
            location,
            years_of_experience,
          } => match years_of_experience {
            Some(yoe) => conn
              .query_row(
                &format!(
                  "{base} AND category = 'full_time' AND location = ?3
                     AND years_of_experience = ?4 {tail}"
                ),
                rusqlite::params![company, role, location, yoe],
                RawBucket::from_row,
              )
              .optional()?,
            // NULL experience only matches other NULL rows.
            None => conn
              .query_row(
                &format!(
                  "{base} AND category = 'full_time' AND location = ?3
                     AND years_of_experience IS NULL {tail}"
                ),
                rusqlite::params![company, role, location],
                RawBucket::from_row,
              )
              .optional()?,
          },
          IdentityKey::Internship { company, role } => conn
            .query_row(
              &format!("{base} AND category = 'internship' {tail}"),
              rusqlite::params![company, role],
              RawBucket::from_row,
            )
            .optional()?,
          IdentityKey::University {
            company,
            role,
            university,
            employment_type,
            year,
          } => conn
            .query_row(
              &format!(
                "{base} AND category = 'university'
                   AND json_extract(additional_data, '$.university') = ?3
                   AND json_extract(additional_data, '$.employment_type') = ?4
                   AND json_extract(additional_data, '$.year') = ?5 {tail}"
              ),
              rusqlite::params![
                company,
                role,
                university,
                employment_type.discriminant(),
                year
              ],
              RawBucket::from_row,
            )
            .optional()?,
        };

        Ok(row)
      })
      .await?;

    raw.map(RawBucket::into_bucket).transpose()
  }

  async fn create_bucket(&self, new: NewBucket) -> Result<AggregateBucket> {
    let bucket = AggregateBucket {
      bucket_id:            Uuid::new_v4(),
      created_at:           Utc::now(),
      company:              new.company,
      role:                 new.role,
      location:             new.location,
      category:             new.category,
      years_of_experience:  new.years_of_experience,
      average_compensation: new.total_compensation,
      min_compensation:     new.total_compensation,
      max_compensation:     new.total_compensation,
      data_point_count:     1,
      base_salary:          new.base_salary,
      bonus:                new.bonus,
      stock_compensation:   new.stock_compensation,
      upvotes:              0,
      downvotes:            0,
      additional_data:      new.additional_data,
    };

    let id_str   = encode_uuid(bucket.bucket_id);
    let at_str   = encode_dt(bucket.created_at);
    let company  = bucket.company.clone();
    let role     = bucket.role.clone();
    let location = bucket.location.clone();
    let category = bucket.category.discriminant().to_owned();
    let yoe      = bucket.years_of_experience;
    let average  = bucket.average_compensation;
    let base     = bucket.base_salary;
    let bonus    = bucket.bonus;
    let stock    = bucket.stock_compensation;
    let ad_str   = encode_additional_data(&bucket.additional_data)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO buckets (
             bucket_id, created_at, company, role, location, category,
             years_of_experience, average_compensation, min_compensation,
             max_compensation, data_point_count, base_salary, bonus,
             stock_compensation, upvotes, downvotes, additional_data
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?8, 1, ?9, ?10, ?11, 0, 0, ?12)",
          rusqlite::params![
            id_str, at_str, company, role, location, category, yoe, average,
            base, bonus, stock, ad_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(bucket)
  }

  async fn update_bucket_stats(
    &self,
    bucket_id: Uuid,
    expected_count: i64,
    stats: BucketStats,
  ) -> Result<Option<AggregateBucket>> {
    let id_str = encode_uuid(bucket_id);

    let raw: Option<RawBucket> = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE buckets SET
             average_compensation = ?1,
             min_compensation     = ?2,
             max_compensation     = ?3,
             data_point_count     = ?4
           WHERE bucket_id = ?5 AND data_point_count = ?6",
          rusqlite::params![
            stats.average,
            stats.min,
            stats.max,
            stats.count,
            id_str,
            expected_count
          ],
        )?;

        if affected == 0 {
          // Condition failed: another fold moved the count first.
          return Ok(None);
        }

        Ok(Self::bucket_row(conn, &id_str)?)
      })
      .await?;

    raw.map(RawBucket::into_bucket).transpose()
  }

  async fn get_bucket(&self, bucket_id: Uuid) -> Result<Option<AggregateBucket>> {
    let id_str = encode_uuid(bucket_id);

    let raw: Option<RawBucket> = self
      .conn
      .call(move |conn| Ok(Self::bucket_row(conn, &id_str)?))
      .await?;

    raw.map(RawBucket::into_bucket).transpose()
  }

  async fn list_buckets(&self, query: &BucketQuery) -> Result<Vec<AggregateBucket>> {
    let company  = query.company.as_deref().map(|s| format!("%{}%", s.to_lowercase()));
    let role     = query.role.as_deref().map(|s| format!("%{}%", s.to_lowercase()));
    let location = query.location.as_deref().map(|s| format!("%{}%", s.to_lowercase()));
    let category = query.category.map(|c| c.discriminant().to_owned());
    let order    = match query.sort {
      BucketSort::Newest => "created_at DESC",
      BucketSort::HighestAverage => "average_compensation DESC",
      BucketSort::MostDataPoints => "data_point_count DESC",
    };
    let limit  = query.limit.unwrap_or(100) as i64;
    let offset = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawBucket> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; parameter indices stay fixed.
        let mut conds: Vec<&'static str> = vec![];
        if company.is_some() {
          conds.push("LOWER(company) LIKE ?1");
        }
        if role.is_some() {
          conds.push("LOWER(role) LIKE ?2");
        }
        if location.is_some() {
          conds.push("LOWER(location) LIKE ?3");
        }
        if category.is_some() {
          conds.push("category = ?4");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {} FROM buckets {where_clause}
           ORDER BY {order} LIMIT ?5 OFFSET ?6",
          RawBucket::COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              company.as_deref(),
              role.as_deref(),
              location.as_deref(),
              category.as_deref(),
              limit,
              offset,
            ],
            RawBucket::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBucket::into_bucket).collect()
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn create_submission(&self, input: SubmissionInput) -> Result<Submission> {
    let submission = Submission {
      submission_id:       Uuid::new_v4(),
      input,
      status:              SubmissionStatus::Pending,
      submitted_at:        Utc::now(),
      reviewed_at:         None,
      reviewed_by:         None,
      rejection_reason:    None,
      published_bucket_id: None,
    };

    let id_str    = encode_uuid(submission.submission_id);
    let input_str = serde_json::to_string(&submission.input)?;
    let at_str    = encode_dt(submission.submitted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions (submission_id, input_json, status, submitted_at)
           VALUES (?1, ?2, 'pending', ?3)",
          rusqlite::params![id_str, input_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(submission)
  }

  async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(submission_id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM submissions WHERE submission_id = ?1",
                RawSubmission::COLUMNS
              ),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_submissions(
    &self,
    status: Option<SubmissionStatus>,
  ) -> Result<Vec<Submission>> {
    let status_str = status.map(|s| s.discriminant().to_owned());

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM submissions WHERE status = ?1
             ORDER BY submitted_at DESC",
            RawSubmission::COLUMNS
          ))?;
          stmt
            .query_map(rusqlite::params![s], RawSubmission::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM submissions ORDER BY submitted_at DESC",
            RawSubmission::COLUMNS
          ))?;
          stmt
            .query_map([], RawSubmission::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubmission::into_submission)
      .collect()
  }

  async fn mark_approved(
    &self,
    submission_id: Uuid,
    reviewer: String,
  ) -> Result<Option<Submission>> {
    let id_str = encode_uuid(submission_id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        // Conditional claim: zero affected rows means another approval won.
        let affected = conn.execute(
          "UPDATE submissions SET
             status = 'approved',
             reviewed_at = ?1,
             reviewed_by = ?2
           WHERE submission_id = ?3 AND status = 'pending'",
          rusqlite::params![at_str, reviewer, id_str],
        )?;

        if affected == 0 {
          return Ok(None);
        }

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM submissions WHERE submission_id = ?1",
                RawSubmission::COLUMNS
              ),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn set_published_bucket(
    &self,
    submission_id: Uuid,
    bucket_id: Uuid,
  ) -> Result<Option<Submission>> {
    let id_str        = encode_uuid(submission_id);
    let bucket_id_str = encode_uuid(bucket_id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE submissions SET published_bucket_id = ?1
           WHERE submission_id = ?2 AND status = 'approved'",
          rusqlite::params![bucket_id_str, id_str],
        )?;

        if affected == 0 {
          return Ok(None);
        }

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM submissions WHERE submission_id = ?1",
                RawSubmission::COLUMNS
              ),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn mark_rejected(
    &self,
    submission_id: Uuid,
    reviewer: String,
    reason: Option<String>,
  ) -> Result<Option<Submission>> {
    let id_str = encode_uuid(submission_id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE submissions SET
             status = 'rejected',
             reviewed_at = ?1,
             reviewed_by = ?2,
             rejection_reason = ?3
           WHERE submission_id = ?4 AND status = 'pending'",
          rusqlite::params![at_str, reviewer, reason, id_str],
        )?;

        if affected == 0 {
          return Ok(None);
        }

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM submissions WHERE submission_id = ?1",
                RawSubmission::COLUMNS
              ),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn get_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
  ) -> Result<Option<VoteKind>> {
    let id_str = encode_uuid(bucket_id);

    let kind_str: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT vote_type FROM bucket_votes
               WHERE bucket_id = ?1 AND voter_id = ?2",
              rusqlite::params![id_str, voter_id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    kind_str.as_deref().map(decode_vote_kind).transpose()
  }

  async fn cast_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
    kind: VoteKind,
  ) -> Result<Option<VoteCounts>> {
    let id_str   = encode_uuid(bucket_id);
    let kind_str = kind.discriminant();
    let at_str   = encode_dt(Utc::now());

    let counts: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT vote_type FROM bucket_votes
             WHERE bucket_id = ?1 AND voter_id = ?2",
            rusqlite::params![id_str, voter_id],
            |row| row.get(0),
          )
          .optional()?;

        if existing.is_some() {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO bucket_votes (bucket_id, voter_id, vote_type, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, voter_id, kind_str, at_str],
        )?;

        let (d_up, d_down) = counter_delta(None, Some(kind));
        tx.execute(
          "UPDATE buckets SET upvotes = upvotes + ?1, downvotes = downvotes + ?2
           WHERE bucket_id = ?3",
          rusqlite::params![d_up, d_down, id_str],
        )?;

        let counts = Self::counters_row(&tx, &id_str)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    Ok(counts.map(|(upvotes, downvotes)| VoteCounts { upvotes, downvotes }))
  }

  async fn change_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
    kind: VoteKind,
  ) -> Result<Option<VoteCounts>> {
    let id_str   = encode_uuid(bucket_id);
    let kind_str = kind.discriminant();

    let counts: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT vote_type FROM bucket_votes
             WHERE bucket_id = ?1 AND voter_id = ?2",
            rusqlite::params![id_str, voter_id],
            |row| row.get(0),
          )
          .optional()?;

        let Some(existing) = existing else {
          return Ok(None);
        };

        // Same type: nothing to change, return current counters.
        if existing == kind_str {
          let counts = Self::counters_row(&tx, &id_str)?;
          tx.commit()?;
          return Ok(counts);
        }

        tx.execute(
          "UPDATE bucket_votes SET vote_type = ?1
           WHERE bucket_id = ?2 AND voter_id = ?3",
          rusqlite::params![kind_str, id_str, voter_id],
        )?;

        let old = match existing.as_str() {
          "up" => VoteKind::Up,
          _ => VoteKind::Down,
        };
        let (d_up, d_down) = counter_delta(Some(old), Some(kind));
        tx.execute(
          "UPDATE buckets SET upvotes = upvotes + ?1, downvotes = downvotes + ?2
           WHERE bucket_id = ?3",
          rusqlite::params![d_up, d_down, id_str],
        )?;

        let counts = Self::counters_row(&tx, &id_str)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    Ok(counts.map(|(upvotes, downvotes)| VoteCounts { upvotes, downvotes }))
  }

  async fn remove_vote(
    &self,
    bucket_id: Uuid,
    voter_id: String,
  ) -> Result<Option<VoteCounts>> {
    let id_str = encode_uuid(bucket_id);

    let counts: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT vote_type FROM bucket_votes
             WHERE bucket_id = ?1 AND voter_id = ?2",
            rusqlite::params![id_str, voter_id],
            |row| row.get(0),
          )
          .optional()?;

        let Some(existing) = existing else {
          return Ok(None);
        };

        tx.execute(
          "DELETE FROM bucket_votes WHERE bucket_id = ?1 AND voter_id = ?2",
          rusqlite::params![id_str, voter_id],
        )?;

        let old = match existing.as_str() {
          "up" => VoteKind::Up,
          _ => VoteKind::Down,
        };
        let (d_up, d_down) = counter_delta(Some(old), None);
        tx.execute(
          "UPDATE buckets SET upvotes = upvotes + ?1, downvotes = downvotes + ?2
           WHERE bucket_id = ?3",
          rusqlite::params![d_up, d_down, id_str],
        )?;

        let counts = Self::counters_row(&tx, &id_str)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    Ok(counts.map(|(upvotes, downvotes)| VoteCounts { upvotes, downvotes }))
  }

  async fn vote_counts(&self, bucket_id: Uuid) -> Result<Option<VoteCounts>> {
    let id_str = encode_uuid(bucket_id);

    let counts: Option<(i64, i64)> = self
      .conn
      .call(move |conn| Ok(Self::counters_row(conn, &id_str)?))
      .await?;

    Ok(counts.map(|(upvotes, downvotes)| VoteCounts { upvotes, downvotes }))
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Option<Comment>> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      bucket_id:  input.bucket_id,
      parent_id:  input.parent_id,
      user_id:    input.user_id,
      author:     input.author,
      body:       input.body,
      upvotes:    0,
      downvotes:  0,
      created_at: Utc::now(),
    };

    let id_str        = encode_uuid(comment.comment_id);
    let bucket_id_str = encode_uuid(comment.bucket_id);
    let parent_id_str = comment.parent_id.map(encode_uuid);
    let user_id       = comment.user_id.clone();
    let author        = comment.author.clone();
    let body          = comment.body.clone();
    let at_str        = encode_dt(comment.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let bucket_exists: bool = conn
          .query_row(
            "SELECT 1 FROM buckets WHERE bucket_id = ?1",
            rusqlite::params![bucket_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !bucket_exists {
          return Ok(false);
        }

        if let Some(parent) = &parent_id_str {
          // Threads are one level deep: the parent must be a top-level
          // comment on the same bucket.
          let parent_of_parent: Option<Option<String>> = conn
            .query_row(
              "SELECT parent_id FROM comments
               WHERE comment_id = ?1 AND bucket_id = ?2",
              rusqlite::params![parent, bucket_id_str],
              |row| row.get(0),
            )
            .optional()?;

          match parent_of_parent {
            None => return Ok(false),
            Some(Some(_)) => return Ok(false),
            Some(None) => {}
          }
        }

        conn.execute(
          "INSERT INTO comments (
             comment_id, bucket_id, parent_id, user_id, author, body,
             upvotes, downvotes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7)",
          rusqlite::params![
            id_str, bucket_id_str, parent_id_str, user_id, author, body,
            at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(comment))
  }

  async fn list_comments(&self, bucket_id: Uuid) -> Result<Vec<Comment>> {
    let id_str = encode_uuid(bucket_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM comments WHERE bucket_id = ?1
           ORDER BY created_at ASC",
          RawComment::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn vote_comment(
    &self,
    comment_id: Uuid,
    kind: VoteKind,
  ) -> Result<Option<VoteCounts>> {
    let id_str = encode_uuid(comment_id);

    let counts: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let (d_up, d_down) = counter_delta(None, Some(kind));
        let affected = conn.execute(
          "UPDATE comments SET upvotes = upvotes + ?1, downvotes = downvotes + ?2
           WHERE comment_id = ?3",
          rusqlite::params![d_up, d_down, id_str],
        )?;

        if affected == 0 {
          return Ok(None);
        }

        Ok(
          conn
            .query_row(
              "SELECT upvotes, downvotes FROM comments WHERE comment_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(counts.map(|(upvotes, downvotes)| VoteCounts { upvotes, downvotes }))
  }
}
