//! API error type and [`axum::response::IntoResponse`] implementation.

use agenda_booking::{ValidationError, error::BoxError};
use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// `challenge` adds a Basic `WWW-Authenticate` header to the response.
  #[error("unauthorized: {reason}")]
  Unauthorized { reason: String, challenge: bool },

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Validation(ValidationError),

  #[error("already reserved: {}", .0.join(", "))]
  Conflict(Vec<String>),

  #[error("store error: {0}")]
  Transport(#[source] BoxError),
}

impl From<agenda_booking::Error> for ApiError {
  fn from(e: agenda_booking::Error) -> Self {
    use agenda_booking::Error as E;
    match e {
      E::Validation(v) => Self::Validation(v),
      E::Conflict(slots) => Self::Conflict(slots),
      E::Transport(source) => Self::Transport(source),
      E::Auth(reason) => Self::Unauthorized { reason, challenge: false },
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    match self {
      ApiError::Unauthorized { challenge, .. } => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response();
        if challenge {
          res.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"agenda\""),
          );
        }
        res
      }
      ApiError::Forbidden(_) => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": message }))).into_response()
      }
      ApiError::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
      }
      ApiError::Validation(_) => {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": message }))).into_response()
      }
      ApiError::Conflict(slots) => (
        StatusCode::CONFLICT,
        Json(json!({ "error": message, "conflicts": slots })),
      )
        .into_response(),
      ApiError::Transport(_) => {
        tracing::warn!(error = %message, "store unavailable");
        (StatusCode::BAD_GATEWAY, Json(json!({ "error": message }))).into_response()
      }
    }
  }
}
