//! SQL schema for the Paygrid SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per identity key: the persisted aggregate the fold path updates.
CREATE TABLE IF NOT EXISTS buckets (
    bucket_id            TEXT PRIMARY KEY,
    created_at           TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    company              TEXT NOT NULL,
    role                 TEXT NOT NULL,
    location             TEXT NOT NULL,
    category             TEXT NOT NULL,   -- 'full_time' | 'internship' | 'university'
    years_of_experience  REAL,            -- NULL is its own identity value
    average_compensation REAL NOT NULL,
    min_compensation     REAL NOT NULL,
    max_compensation     REAL NOT NULL,
    data_point_count     INTEGER NOT NULL DEFAULT 1,
    base_salary          REAL,
    bonus                REAL NOT NULL DEFAULT 0,
    stock_compensation   REAL NOT NULL DEFAULT 0,
    upvotes              INTEGER NOT NULL DEFAULT 0,
    downvotes            INTEGER NOT NULL DEFAULT 0,
    additional_data      TEXT NOT NULL DEFAULT '{}'  -- JSON object
);

-- Submissions held for moderation. The raw input is stored as JSON and
-- re-validated when the approval path folds it.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id       TEXT PRIMARY KEY,
    input_json          TEXT NOT NULL,
    status              TEXT NOT NULL DEFAULT 'pending',
    submitted_at        TEXT NOT NULL,
    reviewed_at         TEXT,
    reviewed_by         TEXT,
    rejection_reason    TEXT,
    published_bucket_id TEXT REFERENCES buckets(bucket_id)
);

-- One vote per (bucket, voter). Counter maintenance happens in the same
-- transaction as the row change; there is no trigger.
CREATE TABLE IF NOT EXISTS bucket_votes (
    bucket_id  TEXT NOT NULL REFERENCES buckets(bucket_id),
    voter_id   TEXT NOT NULL,
    vote_type  TEXT NOT NULL,   -- 'up' | 'down'
    created_at TEXT NOT NULL,
    PRIMARY KEY (bucket_id, voter_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    bucket_id  TEXT NOT NULL REFERENCES buckets(bucket_id),
    parent_id  TEXT REFERENCES comments(comment_id),
    user_id    TEXT,            -- NULL means anonymous
    author     TEXT NOT NULL,
    body       TEXT NOT NULL,
    upvotes    INTEGER NOT NULL DEFAULT 0,
    downvotes  INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS buckets_identity_idx
    ON buckets(company, role, category);
CREATE INDEX IF NOT EXISTS buckets_created_idx  ON buckets(created_at);
CREATE INDEX IF NOT EXISTS submissions_status_idx ON submissions(status);
CREATE INDEX IF NOT EXISTS comments_bucket_idx  ON comments(bucket_id);

PRAGMA user_version = 1;
";
