//! Fixtures shared by the workflow tests.

use std::{
  collections::{HashMap, HashSet},
  sync::{Arc, Mutex},
  time::Duration,
};

use agenda_core::{
  catalog::ResourceKind,
  identity::{CurrentUser, IdentityState},
  reservation::{NewReservation, Reservation},
  store::{Field, Filter, ReservationStore, Subscription},
};
use agenda_store_sqlite::SqliteStore;
use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{Coordinator, identity::StaticIdentity};

pub const FIRST: &str = "07:15 - 08:05";
pub const SECOND: &str = "08:05 - 08:55";
pub const THIRD: &str = "09:15 - 10:05";

/// Generous upper bound for anything that should happen "soon".
pub const SOON: Duration = Duration::from_secs(2);

pub fn march(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, day).unwrap() }

pub fn user(id: &str, name: &str) -> CurrentUser {
  CurrentUser { id: id.into(), display_name: Some(name.into()), email: None }
}

pub fn signed_in(id: &str, name: &str) -> Arc<StaticIdentity> {
  Arc::new(StaticIdentity::signed_in(user(id, name)))
}

pub fn signed_out() -> Arc<StaticIdentity> {
  Arc::new(StaticIdentity::new(IdentityState::SignedOut))
}

pub async fn within<F: std::future::Future>(fut: F) -> F::Output {
  tokio::time::timeout(SOON, fut).await.expect("timed out")
}

// ─── Scripted store ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ScriptedError {
  #[error(transparent)]
  Store(#[from] agenda_store_sqlite::Error),

  #[error("injected failure: {0}")]
  Injected(String),
}

#[derive(Default)]
struct Script {
  first_snapshot_delay: HashMap<String, Duration>,
  failing_slots:        HashSet<String>,
  refuse_subscribe:     bool,
  break_feeds:          bool,
  insert_attempts:      usize,
}

/// An in-memory SQLite store whose behaviour tests can bend.
#[derive(Clone)]
pub struct ScriptedStore {
  pub inner: SqliteStore,
  script:    Arc<Mutex<Script>>,
}

impl ScriptedStore {
  pub async fn new() -> Arc<Self> {
    Arc::new(Self {
      inner:  SqliteStore::open_in_memory().await.expect("in-memory store"),
      script: Arc::default(),
    })
  }

  /// Hold back the first snapshot of subscriptions filtered on `resource_id`.
  pub fn delay_first_snapshot(&self, resource_id: &str, delay: Duration) {
    self
      .script
      .lock()
      .unwrap()
      .first_snapshot_delay
      .insert(resource_id.into(), delay);
  }

  pub fn fail_inserts_for(&self, slot: &str) {
    self.script.lock().unwrap().failing_slots.insert(slot.into());
  }

  pub fn refuse_subscriptions(&self) { self.script.lock().unwrap().refuse_subscribe = true; }

  /// New subscriptions report an error right after their first snapshot.
  pub fn break_feeds_after_first(&self) { self.script.lock().unwrap().break_feeds = true; }

  pub fn insert_attempts(&self) -> usize { self.script.lock().unwrap().insert_attempts }

  /// Write straight to the backing store, bypassing the script.
  pub async fn seed(
    &self,
    kind: ResourceKind,
    resource_id: &str,
    date: NaiveDate,
    slot: &str,
    owner_id: &str,
  ) -> Reservation {
    self
      .inner
      .insert(NewReservation {
        kind,
        resource_id: resource_id.into(),
        date,
        slot: slot.into(),
        group_label: kind.requires_group().then(|| "2ª Série B (Integral)".to_string()),
        teacher: "ANY_TEACHER".into(),
        owner_id: owner_id.into(),
        owner_display_name: owner_id.into(),
        created_at: Utc::now(),
      })
      .await
      .expect("seed insert")
  }

  pub async fn all(&self, kind: ResourceKind) -> Vec<Reservation> {
    self.inner.query(kind, &[]).await.expect("query")
  }
}

impl ReservationStore for ScriptedStore {
  type Error = ScriptedError;

  async fn subscribe(
    &self,
    kind: ResourceKind,
    filters: Vec<Filter>,
  ) -> Result<Subscription<ScriptedError>, ScriptedError> {
    let (delay, break_feed) = {
      let script = self.script.lock().unwrap();
      if script.refuse_subscribe {
        return Err(ScriptedError::Injected("subscription refused".into()));
      }
      let delay = filters
        .iter()
        .find(|f| f.field == Field::ResourceId)
        .and_then(|f| script.first_snapshot_delay.get(&f.value).copied());
      (delay, script.break_feeds)
    };

    let mut inner = self.inner.subscribe(kind, filters).await?;
    let (tx, rx) = mpsc::channel(8);
    let feed = tokio::spawn(async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      while let Some(item) = inner.next().await {
        if tx.send(item.map_err(ScriptedError::from)).await.is_err() {
          return;
        }
        if break_feed {
          let _ = tx.send(Err(ScriptedError::Injected("feed lost".into()))).await;
          return;
        }
      }
    });
    Ok(Subscription::new(rx, feed.abort_handle()))
  }

  async fn insert(&self, record: NewReservation) -> Result<Reservation, ScriptedError> {
    let fail = {
      let mut script = self.script.lock().unwrap();
      script.insert_attempts += 1;
      script.failing_slots.contains(&record.slot)
    };
    if fail {
      return Err(ScriptedError::Injected(format!("insert of {} refused", record.slot)));
    }
    Ok(self.inner.insert(record).await?)
  }

  async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), ScriptedError> {
    Ok(self.inner.delete(kind, id).await?)
  }
}

// ─── Coordinators ────────────────────────────────────────────────────────────

/// A coordinator with resource and date already selected and its view primed.
pub async fn coordinator_on(
  store: &Arc<ScriptedStore>,
  identity: Arc<StaticIdentity>,
  kind: ResourceKind,
  resource_id: &str,
  date: NaiveDate,
) -> Coordinator<ScriptedStore, StaticIdentity> {
  let mut c = Coordinator::new(Arc::clone(store), identity);
  c.set_kind(kind).await.unwrap();
  c.set_resource(resource_id).await.unwrap();
  c.set_date(Some(date)).await.unwrap();
  within(c.view().ready()).await.unwrap();
  c
}
