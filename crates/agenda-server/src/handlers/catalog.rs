//! `GET /catalog`: the static enumerations a client needs to build a form.
//! Served without authentication.

use agenda_core::{catalog::Catalog, store::ReservationStore};
use axum::{Json, extract::State};

use crate::AppState;

pub async fn handler<S>(State(state): State<AppState<S>>) -> Json<Catalog>
where
  S: ReservationStore + 'static,
{
  Json(Catalog::clone(&state.catalog))
}
