//! The Daily Report: every reservation of one kind on one date, with
//! resource names resolved, plus deletion.

use std::sync::Arc;

use agenda_core::{
  catalog::{Catalog, ResourceKind},
  identity::CurrentUser,
  report::{ReservationWithResourceName, project_report},
  reservation::Reservation,
  store::{Filter, ReservationStore},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  live::{LiveQuery, QueryKey},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Who may delete a reservation shown in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
  /// Only the user whose id is on the reservation.
  #[default]
  OwnerOnly,
  /// Anyone. Suits deployments without per-user identity.
  Unrestricted,
}

impl DeletionPolicy {
  pub fn allows(self, reservation: &Reservation, user: Option<&CurrentUser>) -> bool {
    match self {
      Self::Unrestricted => true,
      Self::OwnerOnly => user.is_some_and(|u| u.id == reservation.owner_id),
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

pub struct DailyReport<S: ReservationStore> {
  store:   Arc<S>,
  catalog: Arc<Catalog>,
  policy:  DeletionPolicy,
  query:   LiveQuery<S>,
}

impl<S> DailyReport<S>
where
  S: ReservationStore + 'static,
{
  pub fn new(store: Arc<S>, catalog: Arc<Catalog>, policy: DeletionPolicy) -> Self {
    Self {
      query: LiveQuery::new(Arc::clone(&store)),
      store,
      catalog,
      policy,
    }
  }

  pub fn policy(&self) -> DeletionPolicy { self.policy }

  /// Follow all reservations of `kind` on `date`. With no date the report is
  /// empty and holds no subscription.
  pub async fn select(&mut self, kind: ResourceKind, date: Option<NaiveDate>) -> Result<()> {
    let key = date.map(|date| QueryKey { kind, filters: vec![Filter::date(date)] });
    self.query.replace(key).await
  }

  pub fn clear(&mut self) { self.query.teardown(); }

  /// The current snapshot, projected and sorted by slot.
  pub fn rows(&self) -> Vec<ReservationWithResourceName> {
    self
      .query
      .with_docs(|docs| project_report(docs.iter().cloned(), &self.catalog))
  }

  pub fn can_delete(&self, reservation: &Reservation, user: Option<&CurrentUser>) -> bool {
    self.policy.allows(reservation, user)
  }

  /// Delete one reservation. The row disappears from [`Self::rows`] only
  /// once the store pushes the next snapshot.
  pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()> {
    self.store.delete(kind, id).await.map_err(|e| {
      tracing::warn!(%kind, id, error = %e, "delete failed");
      Error::transport(e)
    })?;
    tracing::info!(%kind, id, "reservation deleted");
    Ok(())
  }

  /// Surface the transport error that cleared the report, if any.
  pub fn check(&self) -> Result<()> {
    match self.query.error() {
      Some(msg) => Err(Error::Transport(msg.into())),
      None => Ok(()),
    }
  }

  /// Wait for the first snapshot of the current selection.
  pub async fn ready(&self) -> Result<()> { self.query.wait_until(|_| true).await }

  /// Wait until the raw snapshot satisfies `pred`.
  pub async fn wait_until(&self, pred: impl Fn(&[Reservation]) -> bool) -> Result<()> {
    self.query.wait_until(pred).await
  }
}
