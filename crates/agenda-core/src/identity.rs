//! The identity collaborator: who is signed in, and how they sign in.
//!
//! The booking layer needs only a stable user id and a human label. How that
//! identity is obtained is a deployment choice captured by
//! [`IdentityStrategy`].

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Label stored on reservations when the identity carries neither a display
/// name nor an email.
pub const UNKNOWN_OWNER: &str = "unknown";

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
  pub id:           String,
  pub display_name: Option<String>,
  pub email:        Option<String>,
}

impl CurrentUser {
  /// Display name, else email, else [`UNKNOWN_OWNER`].
  pub fn label(&self) -> &str {
    self
      .display_name
      .as_deref()
      .or(self.email.as_deref())
      .unwrap_or(UNKNOWN_OWNER)
  }
}

/// Identity as observed by the rest of the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityState {
  /// The provider has not resolved the session yet.
  #[default]
  Loading,
  SignedOut,
  SignedIn(CurrentUser),
}

impl IdentityState {
  pub fn user(&self) -> Option<&CurrentUser> {
    match self {
      Self::SignedIn(user) => Some(user),
      _ => None,
    }
  }
}

/// How a deployment establishes identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStrategy {
  /// Interactive sign-in with a named account.
  #[default]
  Named,
  /// No account; each client gets an opaque id and no display name.
  Anonymous,
  /// A pre-issued token maps to an account.
  CustomToken,
}

/// What a client presents to sign in.
#[derive(Clone)]
pub enum Credentials {
  Password { username: String, password: String },
  Token(String),
  /// Optional client-chosen id; a fresh one is minted when absent.
  Anonymous { client_id: Option<String> },
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Password { username, .. } => f
        .debug_struct("Password")
        .field("username", username)
        .finish_non_exhaustive(),
      Self::Token(_) => f.write_str("Token(..)"),
      Self::Anonymous { client_id } => f
        .debug_struct("Anonymous")
        .field("client_id", client_id)
        .finish(),
    }
  }
}

/// Source of the current identity.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The identity right now.
  fn state(&self) -> IdentityState;

  /// A receiver notified on every identity change, including the first
  /// transition out of [`IdentityState::Loading`].
  fn watch(&self) -> watch::Receiver<IdentityState>;

  fn sign_in(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<CurrentUser, Self::Error>> + Send + '_;

  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
