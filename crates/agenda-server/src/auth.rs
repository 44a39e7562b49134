//! Request authentication for every identity strategy.
//!
//! | Strategy       | Presented as                          |
//! |----------------|---------------------------------------|
//! | `named`        | `Authorization: Basic <user:password>` |
//! | `custom_token` | `Authorization: Bearer <token>`        |
//! | `anonymous`    | optional `X-Client-Id` header          |

use agenda_core::identity::{Credentials, CurrentUser, IdentityStrategy};
use agenda_core::store::ReservationStore;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{AppState, error::ApiError};

pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// The caller, resolved through the configured directory.
pub struct Authenticated(pub CurrentUser);

/// Read the credentials `strategy` expects from request headers.
pub fn credentials_from_headers(
  headers: &HeaderMap,
  strategy: IdentityStrategy,
) -> Result<Credentials, ApiError> {
  let challenge = strategy == IdentityStrategy::Named;
  let reject = |reason: &str| ApiError::Unauthorized { reason: reason.to_owned(), challenge };

  let authorization = || {
    headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| reject("missing Authorization header"))
  };

  match strategy {
    IdentityStrategy::Anonymous => {
      let client_id = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
      Ok(Credentials::Anonymous { client_id })
    }
    IdentityStrategy::Named => {
      let encoded = authorization()?
        .strip_prefix("Basic ")
        .ok_or_else(|| reject("expected Basic credentials"))?;
      let decoded = B64.decode(encoded).map_err(|_| reject("malformed Basic credentials"))?;
      let decoded = String::from_utf8(decoded).map_err(|_| reject("malformed Basic credentials"))?;
      let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| reject("malformed Basic credentials"))?;
      Ok(Credentials::Password { username: username.to_owned(), password: password.to_owned() })
    }
    IdentityStrategy::CustomToken => {
      let token = authorization()?
        .strip_prefix("Bearer ")
        .ok_or_else(|| reject("expected a Bearer token"))?;
      Ok(Credentials::Token(token.to_owned()))
    }
  }
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: ReservationStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let strategy    = state.directory.strategy();
    let credentials = credentials_from_headers(&parts.headers, strategy)?;
    let user = state.directory.authenticate(&credentials).map_err(|e| {
      tracing::debug!(error = %e, "request not authenticated");
      ApiError::Unauthorized {
        reason:    e.to_string(),
        challenge: strategy == IdentityStrategy::Named,
      }
    })?;
    Ok(Authenticated(user))
  }
}
