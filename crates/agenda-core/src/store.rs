//! The `ReservationStore` trait and the live-subscription handle it returns.
//!
//! The trait is implemented by storage backends (e.g. `agenda-store-sqlite`).
//! The booking layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use tokio::{sync::mpsc, task::AbortHandle};

use crate::{
  catalog::ResourceKind,
  reservation::{NewReservation, Reservation},
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// A reservation field that can be matched by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  ResourceId,
  Date,
}

impl Field {
  /// Column / document key for this field.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ResourceId => "resource_id",
      Self::Date => "date",
    }
  }
}

/// `field == value`. Dates compare by their ISO form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
  pub field: Field,
  pub value: String,
}

impl Filter {
  pub fn eq(field: Field, value: impl Into<String>) -> Self {
    Self { field, value: value.into() }
  }

  pub fn resource_id(id: impl Into<String>) -> Self { Self::eq(Field::ResourceId, id) }

  pub fn date(date: NaiveDate) -> Self { Self::eq(Field::Date, date.to_string()) }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// The full set of documents matching a query at one point in time.
pub type Snapshot = Vec<Reservation>;

/// A live query. Yields one complete [`Snapshot`] immediately and another
/// after every change to the partition, until dropped.
///
/// Dropping the handle stops the backend's feed task, so no further
/// snapshots are computed for it.
pub struct Subscription<E> {
  rx:   mpsc::Receiver<Result<Snapshot, E>>,
  feed: Option<AbortHandle>,
}

impl<E> Subscription<E> {
  /// Wrap the receiving half of a snapshot channel and the task feeding it.
  pub fn new(rx: mpsc::Receiver<Result<Snapshot, E>>, feed: AbortHandle) -> Self {
    Self { rx, feed: Some(feed) }
  }

  /// Wait for the next snapshot. `None` once the feed has ended.
  pub async fn next(&mut self) -> Option<Result<Snapshot, E>> { self.rx.recv().await }
}

impl<E> Drop for Subscription<E> {
  fn drop(&mut self) {
    if let Some(feed) = self.feed.take() {
      feed.abort();
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the reservation document store.
///
/// Each [`ResourceKind`] is its own partition. The store enforces no
/// uniqueness on `(resource_id, date, slot)`; double-booking prevention is
/// the caller's job.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ReservationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Open a live query over the `kind` partition. Every filter must hold for
  /// a document to be included.
  fn subscribe(
    &self,
    kind: ResourceKind,
    filters: Vec<Filter>,
  ) -> impl Future<Output = Result<Subscription<Self::Error>, Self::Error>> + Send + '_;

  /// Persist a reservation in the partition named by `record.kind` and
  /// return it with its assigned id.
  fn insert(
    &self,
    record: NewReservation,
  ) -> impl Future<Output = Result<Reservation, Self::Error>> + Send + '_;

  /// Remove a reservation by id. Removing an id that does not exist is not
  /// an error.
  fn delete<'a>(
    &'a self,
    kind: ResourceKind,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
