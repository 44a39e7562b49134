//! SQL schema for the Agenda SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// One table per resource kind. There is deliberately no UNIQUE constraint on
/// `(resource_id, date, slot)`: conflict detection happens before the write,
/// against a live snapshot.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS space_reservations (
    id                 TEXT PRIMARY KEY,
    resource_id        TEXT NOT NULL,
    date               TEXT NOT NULL,   -- YYYY-MM-DD
    slot               TEXT NOT NULL,
    group_label        TEXT,
    teacher            TEXT NOT NULL,
    owner_id           TEXT NOT NULL,
    owner_display_name TEXT NOT NULL,
    created_at         TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS equipment_reservations (
    id                 TEXT PRIMARY KEY,
    resource_id        TEXT NOT NULL,
    date               TEXT NOT NULL,
    slot               TEXT NOT NULL,
    group_label        TEXT,            -- always NULL for equipment
    teacher            TEXT NOT NULL,
    owner_id           TEXT NOT NULL,
    owner_display_name TEXT NOT NULL,
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS space_resource_date_idx     ON space_reservations(resource_id, date);
CREATE INDEX IF NOT EXISTS space_date_idx              ON space_reservations(date);
CREATE INDEX IF NOT EXISTS equipment_resource_date_idx ON equipment_reservations(resource_id, date);
CREATE INDEX IF NOT EXISTS equipment_date_idx          ON equipment_reservations(date);

PRAGMA user_version = 1;
";
