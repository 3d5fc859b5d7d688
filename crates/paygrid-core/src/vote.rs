//! Vote types and counter arithmetic.
//!
//! Each (voter, bucket) pair holds at most one vote. Counter maintenance is
//! an explicit store operation rather than a database trigger; the delta for
//! any vote transition is pure logic so it can be tested without a store.

use serde::{Deserialize, Serialize};

/// The direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
  Up,
  Down,
}

impl VoteKind {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Up => "up",
      Self::Down => "down",
    }
  }
}

/// A bucket's (or comment's) current vote counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
  pub upvotes:   i64,
  pub downvotes: i64,
}

/// The `(upvotes, downvotes)` counter delta for a vote transition.
///
/// Casting is `(None, Some(k))`, removal `(Some(k), None)`, and a change of
/// type decrements one counter while incrementing the other. Re-casting the
/// same type is a zero delta.
pub fn counter_delta(
  old: Option<VoteKind>,
  new: Option<VoteKind>,
) -> (i64, i64) {
  fn weight(vote: Option<VoteKind>) -> (i64, i64) {
    match vote {
      Some(VoteKind::Up) => (1, 0),
      Some(VoteKind::Down) => (0, 1),
      None => (0, 0),
    }
  }
  let (old_up, old_down) = weight(old);
  let (new_up, new_down) = weight(new);
  (new_up - old_up, new_down - old_down)
}
