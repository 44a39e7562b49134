//! Identity providers for the booking workflow.
//!
//! [`Directory`] turns presented [`Credentials`] into a [`CurrentUser`]
//! according to the deployment's [`IdentityStrategy`]. [`SessionIdentity`]
//! wraps a directory in a sign-in / sign-out session with change
//! notification, and [`StaticIdentity`] pins an already-resolved identity
//! (one request, one test).

use std::sync::Arc;

use agenda_core::identity::{
  Credentials, CurrentUser, IdentityProvider, IdentityState, IdentityStrategy,
};
use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Directory ───────────────────────────────────────────────────────────────

/// A named account for the [`IdentityStrategy::Named`] strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  /// Login name; also the stable user id.
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub display_name:  Option<String>,
  #[serde(default)]
  pub email:         Option<String>,
}

/// A pre-issued token for the [`IdentityStrategy::CustomToken`] strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
  pub token:        String,
  pub user_id:      String,
  #[serde(default)]
  pub display_name: Option<String>,
}

/// Resolves credentials to users for one identity strategy.
#[derive(Debug, Clone, Default)]
pub struct Directory {
  strategy: IdentityStrategy,
  accounts: Vec<Account>,
  tokens:   Vec<TokenGrant>,
}

impl Directory {
  pub fn new(strategy: IdentityStrategy, accounts: Vec<Account>, tokens: Vec<TokenGrant>) -> Self {
    Self { strategy, accounts, tokens }
  }

  pub fn strategy(&self) -> IdentityStrategy { self.strategy }

  pub fn authenticate(&self, credentials: &Credentials) -> Result<CurrentUser> {
    match (self.strategy, credentials) {
      (IdentityStrategy::Named, Credentials::Password { username, password }) => {
        let account = self
          .accounts
          .iter()
          .find(|a| &a.username == username)
          .ok_or_else(|| Error::Auth("unknown user or wrong password".into()))?;
        verify_password(password, &account.password_hash)?;
        Ok(CurrentUser {
          id:           account.username.clone(),
          display_name: account.display_name.clone(),
          email:        account.email.clone(),
        })
      }
      (IdentityStrategy::CustomToken, Credentials::Token(token)) => {
        let grant = self
          .tokens
          .iter()
          .find(|g| &g.token == token)
          .ok_or_else(|| Error::Auth("unknown token".into()))?;
        Ok(CurrentUser {
          id:           grant.user_id.clone(),
          display_name: grant.display_name.clone(),
          email:        None,
        })
      }
      (IdentityStrategy::Anonymous, Credentials::Anonymous { client_id }) => Ok(CurrentUser {
        id:           client_id
          .clone()
          .filter(|id| !id.is_empty())
          .unwrap_or_else(|| Uuid::new_v4().to_string()),
        display_name: None,
        email:        None,
      }),
      (strategy, presented) => Err(Error::Auth(format!(
        "{presented:?} cannot be used with the {strategy:?} identity strategy"
      ))),
    }
  }
}

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Auth(format!("argon2 error: {e}")))
}

fn verify_password(password: &str, phc: &str) -> Result<()> {
  let parsed = PasswordHash::new(phc)
    .map_err(|_| Error::Auth("stored password hash is malformed".into()))?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::Auth("unknown user or wrong password".into()))
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// An interactive session backed by a [`Directory`].
///
/// Starts in [`IdentityState::Loading`] until [`SessionIdentity::resolve`]
/// or a sign-in settles it.
pub struct SessionIdentity {
  directory: Arc<Directory>,
  state:     watch::Sender<IdentityState>,
}

impl SessionIdentity {
  pub fn new(directory: Arc<Directory>) -> Self {
    let (state, _) = watch::channel(IdentityState::Loading);
    Self { directory, state }
  }

  /// Settle the initial state, e.g. from a restored session.
  pub fn resolve(&self, restored: Option<CurrentUser>) {
    self.state.send_replace(match restored {
      Some(user) => IdentityState::SignedIn(user),
      None => IdentityState::SignedOut,
    });
  }
}

impl IdentityProvider for SessionIdentity {
  type Error = Error;

  fn state(&self) -> IdentityState { self.state.borrow().clone() }

  fn watch(&self) -> watch::Receiver<IdentityState> { self.state.subscribe() }

  async fn sign_in(&self, credentials: Credentials) -> Result<CurrentUser> {
    match self.directory.authenticate(&credentials) {
      Ok(user) => {
        tracing::info!(user_id = %user.id, "signed in");
        self.state.send_replace(IdentityState::SignedIn(user.clone()));
        Ok(user)
      }
      Err(e) => {
        tracing::info!(error = %e, "sign-in rejected");
        Err(e)
      }
    }
  }

  async fn sign_out(&self) -> Result<()> {
    self.state.send_replace(IdentityState::SignedOut);
    Ok(())
  }
}

// ─── Static ──────────────────────────────────────────────────────────────────

/// A fixed identity that cannot sign in or out.
pub struct StaticIdentity {
  state: watch::Sender<IdentityState>,
}

impl StaticIdentity {
  pub fn new(state: IdentityState) -> Self {
    let (state, _) = watch::channel(state);
    Self { state }
  }

  pub fn signed_in(user: CurrentUser) -> Self { Self::new(IdentityState::SignedIn(user)) }
}

impl IdentityProvider for StaticIdentity {
  type Error = Error;

  fn state(&self) -> IdentityState { self.state.borrow().clone() }

  fn watch(&self) -> watch::Receiver<IdentityState> { self.state.subscribe() }

  async fn sign_in(&self, _credentials: Credentials) -> Result<CurrentUser> {
    Err(Error::Auth("identity is fixed for this context".into()))
  }

  async fn sign_out(&self) -> Result<()> {
    Err(Error::Auth("identity is fixed for this context".into()))
  }
}
