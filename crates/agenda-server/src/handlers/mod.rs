//! Route handlers, one module per resource.

pub mod catalog;
pub mod occupied;
pub mod report;
pub mod reservations;

use agenda_core::{catalog::ResourceKind, reservation::parse_date};
use chrono::NaiveDate;

use crate::error::ApiError;

/// Treat an empty or missing `date` parameter as "no date selected".
pub(crate) fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
  match raw {
    None | Some("") => Ok(None),
    Some(raw) => parse_date(raw).map(Some).map_err(|e| ApiError::BadRequest(e.to_string())),
  }
}

pub(crate) fn kind(raw: &str) -> Result<ResourceKind, ApiError> {
  raw.parse().map_err(|e: agenda_core::Error| ApiError::BadRequest(e.to_string()))
}
