//! Error types for `agenda-booking`.
//!
//! Every variant is terminal for the operation that raised it. Nothing in
//! this crate retries.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A booking request rejected before the store was contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("sign in before booking")]
  NotSignedIn,

  #[error("fill in the resource, date, teacher and at least one slot")]
  Incomplete,

  #[error("choose a group to book a space")]
  MissingGroup,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The listed slots are already held for this resource and date.
  #[error("already reserved: {}", .0.join(", "))]
  Conflict(Vec<String>),

  #[error("store error: {0}")]
  Transport(#[source] BoxError),

  #[error("authentication failed: {0}")]
  Auth(String),
}

impl Error {
  pub(crate) fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Transport(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
