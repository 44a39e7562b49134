//! Reservation — the only mutable entity in the ledger.
//!
//! A reservation holds exactly one resource for one date and one slot. It is
//! never updated after creation; changing a booking means deleting it and
//! committing a new one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, catalog::ResourceKind};

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_owned()))
}

// ─── Reservation ─────────────────────────────────────────────────────────────

/// A persisted booking, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
  /// Store-assigned, opaque.
  pub id:                 String,
  pub kind:               ResourceKind,
  pub resource_id:        String,
  pub date:               NaiveDate,
  pub slot:               String,
  /// Class or cohort; only meaningful for [`ResourceKind::Space`].
  pub group_label:        Option<String>,
  pub teacher:            String,
  pub owner_id:           String,
  pub owner_display_name: String,
  pub created_at:         DateTime<Utc>,
}

// ─── NewReservation ──────────────────────────────────────────────────────────

/// Input to [`crate::store::ReservationStore::insert`]. Carries every field
/// except the id, which the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
  pub kind:               ResourceKind,
  pub resource_id:        String,
  pub date:               NaiveDate,
  pub slot:               String,
  pub group_label:        Option<String>,
  pub teacher:            String,
  pub owner_id:           String,
  pub owner_display_name: String,
  pub created_at:         DateTime<Utc>,
}

impl NewReservation {
  /// Attach a store-assigned id.
  pub fn with_id(self, id: String) -> Reservation {
    Reservation {
      id,
      kind:               self.kind,
      resource_id:        self.resource_id,
      date:               self.date,
      slot:               self.slot,
      group_label:        self.group_label,
      teacher:            self.teacher,
      owner_id:           self.owner_id,
      owner_display_name: self.owner_display_name,
      created_at:         self.created_at,
    }
  }
}
