//! JSON HTTP API for the agenda booking service.
//!
//! Exposes an axum [`Router`] backed by any [`ReservationStore`]. Each
//! request builds its own live view over the shared store handle, so the
//! conflict check a commit runs is as fresh as the store's first snapshot.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = agenda_server::router(AppState::new(store, &config));
//! ```

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use agenda_booking::{
  DeletionPolicy,
  identity::{Account, Directory, TokenGrant},
};
use agenda_core::{catalog::Catalog, identity::IdentityStrategy, store::ReservationStore};
use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AGENDA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  #[serde(default)]
  pub identity:        IdentityStrategy,
  /// Falls back to `unrestricted` for anonymous deployments and
  /// `owner_only` otherwise.
  #[serde(default)]
  pub deletion_policy: Option<DeletionPolicy>,
  #[serde(default)]
  pub users:           Vec<Account>,
  #[serde(default)]
  pub tokens:          Vec<TokenGrant>,
  /// Replaces the built-in catalog when present.
  #[serde(default)]
  pub catalog:         Option<Catalog>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("agenda.db") }

impl ServerConfig {
  pub fn deletion_policy(&self) -> DeletionPolicy {
    self.deletion_policy.unwrap_or(match self.identity {
      IdentityStrategy::Anonymous => DeletionPolicy::Unrestricted,
      IdentityStrategy::Named | IdentityStrategy::CustomToken => DeletionPolicy::OwnerOnly,
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub catalog:   Arc<Catalog>,
  pub directory: Arc<Directory>,
  pub policy:    DeletionPolicy,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, config: &ServerConfig) -> Self {
    Self {
      store,
      catalog: Arc::new(config.catalog.clone().unwrap_or_else(Catalog::builtin)),
      directory: Arc::new(Directory::new(
        config.identity,
        config.users.clone(),
        config.tokens.clone(),
      )),
      policy: config.deletion_policy(),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      catalog:   Arc::clone(&self.catalog),
      directory: Arc::clone(&self.directory),
      policy:    self.policy,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router, nested under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ReservationStore + 'static,
{
  let api = Router::new()
    .route("/catalog", get(handlers::catalog::handler::<S>))
    .route("/occupied", get(handlers::occupied::handler::<S>))
    .route("/report", get(handlers::report::handler::<S>))
    .route("/reservations", post(handlers::reservations::create::<S>))
    .route("/reservations/{kind}/{date}/{id}", delete(handlers::reservations::remove::<S>));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
