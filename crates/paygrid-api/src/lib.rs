//! JSON REST API for Paygrid.
//!
//! Exposes an axum [`Router`] backed by any [`paygrid_core::store::CompStore`].
//! TLS and session management are the caller's responsibility; the moderation
//! surface under `/admin` is protected by HTTP Basic auth.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", paygrid_api::api_router(state.clone()))
//! ```

pub mod auth;
pub mod buckets;
pub mod comments;
pub mod error;
pub mod moderation;
pub mod records;
pub mod submissions;
pub mod votes;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use paygrid_core::store::CompStore;
use serde::Deserialize;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub db_path:             PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CompStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CompStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Direct (trusted) aggregation path
    .route("/records", post(records::create::<S>))
    // Moderated intake
    .route("/submissions", post(submissions::create::<S>))
    // Reviewer surface
    .route("/admin/submissions", get(moderation::list::<S>))
    .route(
      "/admin/submissions/{id}/approve",
      post(moderation::approve::<S>),
    )
    .route(
      "/admin/submissions/{id}/reject",
      post(moderation::reject::<S>),
    )
    // Aggregates
    .route("/buckets", get(buckets::list::<S>))
    .route("/buckets/{id}", get(buckets::get_one::<S>))
    // Votes
    .route(
      "/buckets/{id}/vote",
      get(votes::status::<S>)
        .post(votes::cast::<S>)
        .put(votes::change::<S>)
        .delete(votes::remove::<S>),
    )
    // Comments
    .route(
      "/buckets/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/comments/{id}/vote", post(comments::vote::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use paygrid_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig {
        username:      "reviewer".to_string(),
        password_hash: hash,
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_json(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value, axum::http::HeaderMap) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(a) = auth {
      builder = builder.header(header::AUTHORIZATION, a);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = api_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value, headers)
  }

  fn fulltime_record(company: &str, total: &str) -> Value {
    json!({
      "company": company,
      "role": "Engineer",
      "location": "Pune",
      "category": "full_time",
      "total_compensation": total,
    })
  }

  // ── Records ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_record_returns_201_with_bucket() {
    let state = make_state("secret").await;
    let (status, body, _) = oneshot_json(
      state,
      "POST",
      "/records",
      None,
      Some(fulltime_record("Acme", "1200000")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data_point_count"], 1);
    assert_eq!(body["average_compensation"], 1_200_000.0);
  }

  #[tokio::test]
  async fn post_invalid_record_returns_400() {
    let state = make_state("secret").await;
    let (status, body, _) = oneshot_json(
      state,
      "POST",
      "/records",
      None,
      Some(fulltime_record("", "1200000")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("company"));
  }

  #[tokio::test]
  async fn get_missing_bucket_returns_404() {
    let state = make_state("secret").await;
    let (status, _, _) = oneshot_json(
      state,
      "GET",
      &format!("/buckets/{}", Uuid::new_v4()),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Moderation auth ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_without_credentials_returns_401_with_challenge() {
    let state = make_state("secret").await;
    let (status, _, headers) =
      oneshot_json(state, "GET", "/admin/submissions", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let challenge = headers
      .get(header::WWW_AUTHENTICATE)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(challenge.starts_with("Basic"), "challenge: {challenge}");
  }

  #[tokio::test]
  async fn admin_with_wrong_password_returns_401() {
    let state = make_state("secret").await;
    let auth = auth_header("reviewer", "wrong");
    let (status, _, _) =
      oneshot_json(state, "GET", "/admin/submissions", Some(&auth), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Moderation workflow over HTTP ───────────────────────────────────────────

  #[tokio::test]
  async fn submission_approval_flow() {
    let state = make_state("secret").await;
    let auth = auth_header("reviewer", "secret");

    let (status, submission, _) = oneshot_json(
      state.clone(),
      "POST",
      "/submissions",
      None,
      Some(fulltime_record("Acme", "800000")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submission["status"], "pending");
    let id = submission["submission_id"].as_str().unwrap().to_owned();

    let (status, pending, _) = oneshot_json(
      state.clone(),
      "GET",
      "/admin/submissions?status=pending",
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, approved, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/admin/submissions/{id}/approve"),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["submission"]["status"], "approved");
    assert_eq!(approved["submission"]["reviewed_by"], "reviewer");
    assert_eq!(approved["bucket"]["data_point_count"], 1);

    // A second approval conflicts and does not fold again.
    let (status, _, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/admin/submissions/{id}/approve"),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, buckets, _) =
      oneshot_json(state, "GET", "/buckets", None, None).await;
    assert_eq!(buckets.as_array().unwrap().len(), 1);
    assert_eq!(buckets[0]["data_point_count"], 1);
  }

  #[tokio::test]
  async fn approve_missing_submission_returns_404() {
    let state = make_state("secret").await;
    let auth = auth_header("reviewer", "secret");
    let (status, _, _) = oneshot_json(
      state,
      "POST",
      &format!("/admin/submissions/{}/approve", Uuid::new_v4()),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Votes ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn vote_endpoints_map_statuses() {
    let state = make_state("secret").await;

    let (_, bucket, _) = oneshot_json(
      state.clone(),
      "POST",
      "/records",
      None,
      Some(fulltime_record("Acme", "1200000")),
    )
    .await;
    let id = bucket["bucket_id"].as_str().unwrap().to_owned();
    let vote = json!({ "voter_id": "user-1", "vote_type": "up" });

    let (status, counts, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/buckets/{id}/vote"),
      None,
      Some(vote.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(counts["upvotes"], 1);

    // Duplicate cast conflicts.
    let (status, _, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/buckets/{id}/vote"),
      None,
      Some(vote),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Change is a replace.
    let (status, counts, _) = oneshot_json(
      state.clone(),
      "PUT",
      &format!("/buckets/{id}/vote"),
      None,
      Some(json!({ "voter_id": "user-1", "vote_type": "down" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts["upvotes"], 0);
    assert_eq!(counts["downvotes"], 1);

    // Voting on a missing bucket is a 404, not a conflict.
    let (status, _, _) = oneshot_json(
      state,
      "POST",
      &format!("/buckets/{}/vote", Uuid::new_v4()),
      None,
      Some(json!({ "voter_id": "user-1", "vote_type": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Comments ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comment_endpoints_map_statuses() {
    let state = make_state("secret").await;

    let (_, bucket, _) = oneshot_json(
      state.clone(),
      "POST",
      "/records",
      None,
      Some(fulltime_record("Acme", "1200000")),
    )
    .await;
    let id = bucket["bucket_id"].as_str().unwrap().to_owned();

    let (status, comment, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/buckets/{id}/comments"),
      None,
      Some(json!({ "author": "Alice", "body": "Matches my offer." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["comment_id"].as_str().unwrap().to_owned();

    let (status, reply, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/buckets/{id}/comments"),
      None,
      Some(json!({
        "parent_id": comment_id,
        "author": "Bob",
        "body": "Same here.",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply_id = reply["comment_id"].as_str().unwrap().to_owned();

    // Replying to a reply is refused with a 400.
    let (status, _, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/buckets/{id}/comments"),
      None,
      Some(json!({
        "parent_id": reply_id,
        "author": "Carol",
        "body": "Too deep.",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Commenting on a missing bucket is a 404.
    let (status, _, _) = oneshot_json(
      state,
      "POST",
      &format!("/buckets/{}/comments", Uuid::new_v4()),
      None,
      Some(json!({ "author": "Alice", "body": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
