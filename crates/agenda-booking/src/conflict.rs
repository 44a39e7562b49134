//! The Live Conflict View: which slots are already taken for one
//! resource on one date.

use std::{collections::BTreeSet, sync::Arc};

use agenda_core::{
  catalog::ResourceKind,
  store::{Filter, ReservationStore},
};
use chrono::NaiveDate;

use crate::{
  Error, Result,
  live::{LiveQuery, QueryKey},
};

/// Occupied slots for the selected `(kind, resource, date)`, kept current by
/// a store subscription.
///
/// The view is eventually consistent with the store. In particular it may not
/// yet include a write that has just been acknowledged, and two clients can
/// both see a slot as free at the same moment.
pub struct LiveConflictView<S: ReservationStore> {
  query: LiveQuery<S>,
}

impl<S> LiveConflictView<S>
where
  S: ReservationStore + 'static,
{
  pub fn new(store: Arc<S>) -> Self { Self { query: LiveQuery::new(store) } }

  /// Follow a new selection. When the resource id or the date is missing the
  /// view is empty and holds no subscription.
  ///
  /// The previous subscription is torn down before the new one is opened.
  pub async fn select(
    &mut self,
    kind:        ResourceKind,
    resource_id: &str,
    date:        Option<NaiveDate>,
  ) -> Result<()> {
    let key = match date {
      Some(date) if !resource_id.is_empty() => Some(QueryKey {
        kind,
        filters: vec![Filter::resource_id(resource_id), Filter::date(date)],
      }),
      _ => None,
    };
    self.query.replace(key).await
  }

  /// Release the subscription and empty the view.
  pub fn clear(&mut self) { self.query.teardown(); }

  /// Whether a subscription is currently held.
  pub fn is_active(&self) -> bool { self.query.key().is_some() }

  pub fn occupied(&self) -> BTreeSet<String> {
    self
      .query
      .with_docs(|docs| docs.iter().map(|r| r.slot.clone()).collect())
  }

  /// The subset of `requested` that is already taken, in request order.
  pub fn conflicts(&self, requested: &[String]) -> Vec<String> {
    self.query.with_docs(|docs| {
      requested
        .iter()
        .filter(|slot| docs.iter().any(|r| &r.slot == *slot))
        .cloned()
        .collect()
    })
  }

  /// Surface the transport error that cleared the view, if any.
  pub fn check(&self) -> Result<()> {
    match self.query.error() {
      Some(msg) => Err(Error::Transport(msg.into())),
      None => Ok(()),
    }
  }

  /// Wait for the first snapshot of the current selection.
  pub async fn ready(&self) -> Result<()> { self.query.wait_until(|_| true).await }

  /// Wait until the occupied set satisfies `pred`.
  pub async fn wait_until(&self, pred: impl Fn(&BTreeSet<String>) -> bool) -> Result<()> {
    self
      .query
      .wait_until(|docs| pred(&docs.iter().map(|r| r.slot.clone()).collect()))
      .await
  }
}
