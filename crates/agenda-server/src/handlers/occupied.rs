//! `GET /occupied?kind=&resource_id=&date=`
//!
//! The slots already held for one resource on one date. Any empty input
//! yields an empty list.

use std::sync::Arc;

use agenda_booking::LiveConflictView;
use agenda_core::store::ReservationStore;
use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use super::{kind, optional_date};
use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct OccupiedParams {
  pub kind:        String,
  #[serde(default)]
  pub resource_id: String,
  #[serde(default)]
  pub date:        Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Occupied {
  pub occupied: Vec<String>,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  _user: Authenticated,
  Query(params): Query<OccupiedParams>,
) -> Result<Json<Occupied>, ApiError>
where
  S: ReservationStore + 'static,
{
  let kind = kind(&params.kind)?;
  let date = optional_date(params.date.as_deref())?;

  let mut view = LiveConflictView::new(Arc::clone(&state.store));
  view.select(kind, &params.resource_id, date).await?;
  view.ready().await?;

  Ok(Json(Occupied { occupied: view.occupied().into_iter().collect() }))
}
