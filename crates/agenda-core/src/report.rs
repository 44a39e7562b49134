//! The daily report read model: reservations joined with their resource's
//! display name.
//!
//! Never stored, always derived. Recomputed from scratch on every snapshot so
//! it can never drift from the catalog.

use serde::{Deserialize, Serialize};

use crate::{catalog::Catalog, reservation::Reservation};

/// A [`Reservation`] with its resource's display name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationWithResourceName {
  #[serde(flatten)]
  pub reservation:   Reservation,
  pub resource_name: String,
}

/// Resolve one reservation against the catalog. Unknown ids resolve to
/// [`crate::catalog::UNKNOWN_RESOURCE`].
pub fn project(reservation: Reservation, catalog: &Catalog) -> ReservationWithResourceName {
  let resource_name = catalog
    .resource_name(reservation.kind, &reservation.resource_id)
    .to_owned();
  ReservationWithResourceName { reservation, resource_name }
}

/// Project a whole snapshot and order it by slot label.
///
/// Slot labels start with a zero-padded `HH:MM`, so plain string ordering is
/// chronological.
pub fn project_report(
  reservations: impl IntoIterator<Item = Reservation>,
  catalog: &Catalog,
) -> Vec<ReservationWithResourceName> {
  let mut rows: Vec<_> = reservations
    .into_iter()
    .map(|r| project(r, catalog))
    .collect();
  rows.sort_by(|a, b| a.reservation.slot.cmp(&b.reservation.slot));
  rows
}
