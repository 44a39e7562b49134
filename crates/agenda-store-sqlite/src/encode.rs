//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and dates as `YYYY-MM-DD`.

use agenda_core::{
  catalog::ResourceKind,
  reservation::{Reservation, parse_date},
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── Partition ───────────────────────────────────────────────────────────────

pub fn table_name(kind: ResourceKind) -> &'static str {
  match kind {
    ResourceKind::Space => "space_reservations",
    ResourceKind::Equipment => "equipment_reservations",
  }
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// Column order shared by every SELECT in this crate.
pub const COLUMNS: &str =
  "id, resource_id, date, slot, group_label, teacher, owner_id, owner_display_name, created_at";

/// A reservation row exactly as SQLite returns it.
pub struct RawReservation {
  pub id:                 String,
  pub resource_id:        String,
  pub date:               String,
  pub slot:               String,
  pub group_label:        Option<String>,
  pub teacher:            String,
  pub owner_id:           String,
  pub owner_display_name: String,
  pub created_at:         String,
}

impl RawReservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      resource_id:        row.get(1)?,
      date:               row.get(2)?,
      slot:               row.get(3)?,
      group_label:        row.get(4)?,
      teacher:            row.get(5)?,
      owner_id:           row.get(6)?,
      owner_display_name: row.get(7)?,
      created_at:         row.get(8)?,
    })
  }

  /// The kind is not a column; it is implied by the table the row came from.
  pub fn into_reservation(self, kind: ResourceKind) -> Result<Reservation> {
    Ok(Reservation {
      id: self.id,
      kind,
      resource_id: self.resource_id,
      date: parse_date(&self.date)?,
      slot: self.slot,
      group_label: self.group_label,
      teacher: self.teacher,
      owner_id: self.owner_id,
      owner_display_name: self.owner_display_name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
