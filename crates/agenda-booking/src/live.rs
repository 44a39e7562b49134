//! A store subscription whose latest snapshot is kept in memory.
//!
//! Each call to [`LiveQuery::replace`] starts a new *generation*. The feed
//! task of a superseded generation is aborted, and any snapshot it might
//! still deliver is discarded under the state lock, so a slow first response
//! for an old selection can never overwrite the current one.

use std::{
  fmt::Display,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use agenda_core::{
  catalog::ResourceKind,
  reservation::Reservation,
  store::{Filter, ReservationStore, Snapshot, Subscription},
};
use tokio::{sync::watch, task::JoinHandle};

use crate::{Error, Result};

/// What a live query is subscribed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryKey {
  pub kind:    ResourceKind,
  pub filters: Vec<Filter>,
}

#[derive(Default)]
struct State {
  generation: u64,
  docs:       Snapshot,
  /// At least one snapshot of the current generation has been applied.
  primed:     bool,
  error:      Option<String>,
}

struct Shared {
  state:   Mutex<State>,
  /// Bumped after every applied update; waiters watch it.
  version: watch::Sender<u64>,
}

impl Shared {
  fn lock(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn bump(&self) { self.version.send_modify(|v| *v = v.wrapping_add(1)); }
}

pub(crate) struct LiveQuery<S: ReservationStore> {
  store:  Arc<S>,
  shared: Arc<Shared>,
  feed:   Option<JoinHandle<()>>,
  key:    Option<QueryKey>,
}

impl<S> LiveQuery<S>
where
  S: ReservationStore + 'static,
{
  pub fn new(store: Arc<S>) -> Self {
    let (version, _) = watch::channel(0);
    Self {
      store,
      shared: Arc::new(Shared { state: Mutex::new(State::default()), version }),
      feed: None,
      key: None,
    }
  }

  pub fn key(&self) -> Option<&QueryKey> { self.key.as_ref() }

  /// Drop the current subscription and empty the snapshot. Synchronous: once
  /// this returns, nothing from the old feed will be applied.
  pub fn teardown(&mut self) {
    if let Some(feed) = self.feed.take() {
      feed.abort();
    }
    {
      let mut state = self.shared.lock();
      state.generation += 1;
      state.docs.clear();
      state.primed = false;
      state.error = None;
    }
    self.key = None;
    self.shared.bump();
  }

  /// Point the query at `key`, or at nothing. A no-op when `key` is already
  /// current and healthy.
  pub async fn replace(&mut self, key: Option<QueryKey>) -> Result<()> {
    if self.key == key && self.error().is_none() {
      return Ok(());
    }
    self.teardown();

    let Some(key) = key else { return Ok(()) };
    let generation = self.shared.lock().generation;
    tracing::debug!(kind = %key.kind, filters = ?key.filters, generation, "opening live query");

    let subscription = match self.store.subscribe(key.kind, key.filters.clone()).await {
      Ok(sub) => sub,
      Err(e) => {
        tracing::warn!(kind = %key.kind, error = %e, "live query subscription failed");
        self.shared.lock().error = Some(e.to_string());
        self.key = Some(key);
        self.shared.bump();
        return Err(Error::transport(e));
      }
    };

    self.feed = Some(tokio::spawn(feed(
      Arc::clone(&self.shared),
      generation,
      subscription,
    )));
    self.key = Some(key);
    Ok(())
  }

  /// Run `f` over the latest snapshot.
  pub fn with_docs<R>(&self, f: impl FnOnce(&[Reservation]) -> R) -> R {
    f(&self.shared.lock().docs)
  }

  /// The error that ended the current feed, if any.
  pub fn error(&self) -> Option<String> { self.shared.lock().error.clone() }

  /// Wait until a snapshot of the current generation satisfies `pred`.
  /// Returns immediately when no query is held, and fails when the feed
  /// reports an error.
  pub async fn wait_until(&self, pred: impl Fn(&[Reservation]) -> bool) -> Result<()> {
    if self.key.is_none() {
      return Ok(());
    }
    // Subscribe before checking so an update between the check and the wait
    // is not lost.
    let mut version = self.shared.version.subscribe();
    loop {
      {
        let state = self.shared.lock();
        if let Some(msg) = &state.error {
          return Err(Error::Transport(msg.clone().into()));
        }
        if state.primed && pred(&state.docs) {
          return Ok(());
        }
      }
      if version.changed().await.is_err() {
        return Err(Error::Transport("live query closed".into()));
      }
    }
  }
}

impl<S: ReservationStore> Drop for LiveQuery<S> {
  fn drop(&mut self) {
    if let Some(feed) = self.feed.take() {
      feed.abort();
    }
  }
}

/// Apply snapshots from `sub` for as long as `generation` is current.
async fn feed<E: Display>(shared: Arc<Shared>, generation: u64, mut sub: Subscription<E>) {
  while let Some(item) = sub.next().await {
    let finished = {
      let mut state = shared.lock();
      if state.generation != generation {
        return;
      }
      match item {
        Ok(docs) => {
          state.docs = docs;
          state.primed = true;
          false
        }
        Err(e) => {
          tracing::warn!(generation, error = %e, "live query failed; view cleared");
          state.docs.clear();
          state.primed = false;
          state.error = Some(e.to_string());
          true
        }
      }
    };
    shared.bump();
    if finished {
      return;
    }
  }
}
