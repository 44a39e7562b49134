//! `GET /report?kind=&date=`: every reservation of one kind on one date,
//! sorted by slot, each flagged with whether the caller may delete it.

use std::sync::Arc;

use agenda_booking::DailyReport;
use agenda_core::{report::ReservationWithResourceName, store::ReservationStore};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use super::{kind, optional_date};
use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub kind: String,
  #[serde(default)]
  pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
  #[serde(flatten)]
  pub row:        ReservationWithResourceName,
  pub can_delete: bool,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Query(params): Query<ReportParams>,
) -> Result<Json<Vec<ReportRow>>, ApiError>
where
  S: ReservationStore + 'static,
{
  let kind = kind(&params.kind)?;
  let date = optional_date(params.date.as_deref())?;

  let mut report =
    DailyReport::new(Arc::clone(&state.store), Arc::clone(&state.catalog), state.policy);
  report.select(kind, date).await?;
  report.ready().await?;

  let rows = report
    .rows()
    .into_iter()
    .map(|row| ReportRow {
      can_delete: report.can_delete(&row.reservation, Some(&user)),
      row,
    })
    .collect();
  Ok(Json(rows))
}
