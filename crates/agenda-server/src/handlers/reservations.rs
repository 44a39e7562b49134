//! Handlers for `/reservations`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/reservations` | Body: a booking form; 201 with one record per slot |
//! | `DELETE` | `/reservations/{kind}/{date}/{id}` | 204, also when `id` is absent |

use std::sync::Arc;

use agenda_booking::{BookingForm, Coordinator, DailyReport, identity::StaticIdentity};
use agenda_core::{reservation::Reservation, store::ReservationStore};
use axum::{
  Json,
  extract::{FromRequest, Path, State},
  http::StatusCode,
  response::IntoResponse,
};

use super::{kind, optional_date};
use crate::{AppState, auth::Authenticated, error::ApiError};

/// A JSON body whose rejection is reported as an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /reservations`
///
/// Body fields: `kind`, `resource_id`, `date`, `slots`, `group`, `teacher`.
/// Missing fields count as empty and fail validation with 422 before the
/// store is consulted. A body that is not a booking form is a 400.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  JsonBody(form): JsonBody<BookingForm>,
) -> Result<(StatusCode, Json<Vec<Reservation>>), ApiError>
where
  S: ReservationStore + 'static,
{
  let identity = Arc::new(StaticIdentity::signed_in(user));
  let mut coordinator = Coordinator::new(Arc::clone(&state.store), identity);

  let saved = coordinator.submit(form).await?;
  Ok((StatusCode::CREATED, Json(saved)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /reservations/{kind}/{date}/{id}`
///
/// The reservation is looked up in that day's report so the deletion policy
/// can be checked against its owner.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path((raw_kind, raw_date, id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReservationStore + 'static,
{
  let kind = kind(&raw_kind)?;
  let date = optional_date(Some(&raw_date))?
    .ok_or_else(|| ApiError::BadRequest("date is required".into()))?;

  let mut report =
    DailyReport::new(Arc::clone(&state.store), Arc::clone(&state.catalog), state.policy);
  report.select(kind, Some(date)).await?;
  report.ready().await?;

  let Some(target) = report.rows().into_iter().find(|row| row.reservation.id == id) else {
    tracing::debug!(%kind, %date, %id, "nothing to delete");
    return Ok(StatusCode::NO_CONTENT);
  };
  if !report.can_delete(&target.reservation, Some(&user)) {
    return Err(ApiError::Forbidden(format!(
      "reservation {id} belongs to {}",
      target.reservation.owner_display_name
    )));
  }

  report.delete(kind, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}
