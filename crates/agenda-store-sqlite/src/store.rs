//! [`SqliteStore`] — the SQLite implementation of [`ReservationStore`].

use std::path::Path;

use agenda_core::{
  catalog::ResourceKind,
  reservation::{NewReservation, Reservation},
  store::{Filter, ReservationStore, Snapshot, Subscription},
};
use tokio::sync::{
  broadcast::{self, error::RecvError},
  mpsc,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{COLUMNS, RawReservation, encode_dt, table_name},
  schema::SCHEMA,
};

/// Change notifications buffered per subscriber before it is told it lagged.
const CHANGE_CAPACITY: usize = 64;
/// Snapshots buffered per subscription before the feed waits on the reader.
const SNAPSHOT_BUFFER: usize = 8;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A reservation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and change feed are
/// reference-counted, and every clone sees the same subscriptions.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<ResourceKind>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
    let store = Self { conn, changes };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a one-off equality query against a partition.
  pub async fn query(&self, kind: ResourceKind, filters: &[Filter]) -> Result<Snapshot> {
    let where_clause = if filters.is_empty() {
      String::new()
    } else {
      let conds: Vec<String> = filters
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} = ?{}", f.field.as_str(), i + 1))
        .collect();
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT {COLUMNS} FROM {table} {where_clause} ORDER BY created_at",
      table = table_name(kind),
    );
    let values: Vec<String> = filters.iter().map(|f| f.value.clone()).collect();

    let raws: Vec<RawReservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values.iter()), RawReservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| raw.into_reservation(kind))
      .collect()
  }

  fn notify(&self, kind: ResourceKind) {
    // Fails only when nobody is subscribed.
    let _ = self.changes.send(kind);
  }
}

/// Wait until `kind` changes. Returns `false` once the feed is closed.
async fn next_change(changes: &mut broadcast::Receiver<ResourceKind>, kind: ResourceKind) -> bool {
  loop {
    match changes.recv().await {
      Ok(changed) if changed == kind => return true,
      Ok(_) => continue,
      // Missed notifications collapse into one refresh.
      Err(RecvError::Lagged(_)) => return true,
      Err(RecvError::Closed) => return false,
    }
  }
}

// ─── ReservationStore impl ───────────────────────────────────────────────────

impl ReservationStore for SqliteStore {
  type Error = Error;

  async fn subscribe(
    &self,
    kind:    ResourceKind,
    filters: Vec<Filter>,
  ) -> Result<Subscription<Error>> {
    // Register for changes before the first query so no write can slip
    // between the snapshot and the wait.
    let mut changes = self.changes.subscribe();
    let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
    let store = self.clone();

    let feed = tokio::spawn(async move {
      loop {
        let snapshot = store.query(kind, &filters).await;
        let failed = snapshot.is_err();
        if tx.send(snapshot).await.is_err() || failed {
          return;
        }
        if !next_change(&mut changes, kind).await {
          return;
        }
      }
    });

    Ok(Subscription::new(rx, feed.abort_handle()))
  }

  async fn insert(&self, record: NewReservation) -> Result<Reservation> {
    let kind        = record.kind;
    let reservation = record.with_id(Uuid::new_v4().hyphenated().to_string());

    let sql = format!(
      "INSERT INTO {} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      table_name(kind),
    );
    let id_str         = reservation.id.clone();
    let resource_id    = reservation.resource_id.clone();
    let date_str       = reservation.date.to_string();
    let slot           = reservation.slot.clone();
    let group_label    = reservation.group_label.clone();
    let teacher        = reservation.teacher.clone();
    let owner_id       = reservation.owner_id.clone();
    let owner_name     = reservation.owner_display_name.clone();
    let created_at_str = encode_dt(reservation.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &sql,
          rusqlite::params![
            id_str,
            resource_id,
            date_str,
            slot,
            group_label,
            teacher,
            owner_id,
            owner_name,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.notify(kind);
    Ok(reservation)
  }

  async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()> {
    let sql    = format!("DELETE FROM {} WHERE id = ?1", table_name(kind));
    let id_str = id.to_owned();

    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id_str])?))
      .await?;

    if removed > 0 {
      self.notify(kind);
    }
    Ok(())
  }
}
