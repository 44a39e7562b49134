//! The Reservation Coordinator: owns the booking form, keeps the conflict
//! view aligned with it, and commits multi-slot bookings.

use std::sync::Arc;

use agenda_core::{
  catalog::ResourceKind,
  identity::{CurrentUser, IdentityProvider, IdentityState},
  reservation::{NewReservation, Reservation},
  store::ReservationStore,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, ValidationError, conflict::LiveConflictView};

// ─── Form ────────────────────────────────────────────────────────────────────

/// The user's in-progress selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingForm {
  pub kind:        ResourceKind,
  pub resource_id: String,
  pub date:        Option<NaiveDate>,
  /// Selected slots, in the order they were picked.
  pub slots:       Vec<String>,
  /// Class or cohort; required for spaces, ignored for equipment.
  pub group:       String,
  pub teacher:     String,
}

impl BookingForm {
  /// The checks that need no store: identity, required fields, and the
  /// group for spaces. Yields the booking user and date.
  pub fn validate<'a>(
    &self,
    identity: &'a IdentityState,
  ) -> Result<(&'a CurrentUser, NaiveDate), ValidationError> {
    let user = identity.user().ok_or(ValidationError::NotSignedIn)?;

    let date = match self.date {
      Some(date)
        if !self.resource_id.is_empty() && !self.slots.is_empty() && !self.teacher.is_empty() =>
      {
        date
      }
      _ => return Err(ValidationError::Incomplete),
    };

    if self.kind.requires_group() && self.group.is_empty() {
      return Err(ValidationError::MissingGroup);
    }
    Ok((user, date))
  }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct Coordinator<S: ReservationStore, I> {
  store:    Arc<S>,
  identity: Arc<I>,
  view:     LiveConflictView<S>,
  form:     BookingForm,
}

impl<S, I> Coordinator<S, I>
where
  S: ReservationStore + 'static,
  I: IdentityProvider,
{
  pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
    Self {
      view: LiveConflictView::new(Arc::clone(&store)),
      store,
      identity,
      form: BookingForm::default(),
    }
  }

  pub fn form(&self) -> &BookingForm { &self.form }

  pub fn view(&self) -> &LiveConflictView<S> { &self.view }

  // ── Selection ─────────────────────────────────────────────────────────

  /// Switch between spaces and equipment. Resource, slots and group belong
  /// to the old catalog and are cleared.
  pub async fn set_kind(&mut self, kind: ResourceKind) -> Result<()> {
    if self.form.kind == kind {
      return Ok(());
    }
    self.form.kind = kind;
    self.form.resource_id.clear();
    self.form.slots.clear();
    self.form.group.clear();
    self.follow_selection().await
  }

  pub async fn set_resource(&mut self, resource_id: impl Into<String>) -> Result<()> {
    self.form.resource_id = resource_id.into();
    self.follow_selection().await
  }

  pub async fn set_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
    self.form.date = date;
    self.follow_selection().await
  }

  /// Select or deselect one slot. Selecting an already-selected slot does
  /// nothing.
  pub fn toggle_slot(&mut self, slot: &str, selected: bool) {
    let present = self.form.slots.iter().any(|s| s == slot);
    if selected && !present {
      self.form.slots.push(slot.to_owned());
    } else if !selected {
      self.form.slots.retain(|s| s != slot);
    }
  }

  pub fn set_group(&mut self, group: impl Into<String>) { self.form.group = group.into(); }

  pub fn set_teacher(&mut self, teacher: impl Into<String>) { self.form.teacher = teacher.into(); }

  /// Replace the whole selection at once and follow the new resource and
  /// date with a single subscription. Repeated slots collapse to one.
  pub async fn load(&mut self, mut form: BookingForm) -> Result<()> {
    let slots = std::mem::take(&mut form.slots);
    self.form = form;
    for slot in &slots {
      self.toggle_slot(slot, true);
    }
    self.follow_selection().await
  }

  async fn follow_selection(&mut self) -> Result<()> {
    let BookingForm { kind, resource_id, date, .. } = &self.form;
    self.view.select(*kind, resource_id, *date).await
  }

  // ── Commit ────────────────────────────────────────────────────────────

  /// Validate the form and build one record per selected slot.
  ///
  /// Checks run in a fixed order and the first failure aborts: identity,
  /// required fields, group (spaces only), the health of the live view, then
  /// conflicts against its latest snapshot.
  pub fn prepare(&self) -> Result<Vec<NewReservation>> {
    let state        = self.identity.state();
    let form         = &self.form;
    let (user, date) = form.validate(&state)?;

    // A view that lost its feed has been emptied and would clear any slot.
    self.view.check()?;

    let conflicts = self.view.conflicts(&form.slots);
    if !conflicts.is_empty() {
      return Err(Error::Conflict(conflicts));
    }

    let group_label = form.kind.requires_group().then(|| form.group.clone());
    Ok(
      form
        .slots
        .iter()
        .map(|slot| NewReservation {
          kind:               form.kind,
          resource_id:        form.resource_id.clone(),
          date,
          slot:               slot.clone(),
          group_label:        group_label.clone(),
          teacher:            form.teacher.clone(),
          owner_id:           user.id.clone(),
          owner_display_name: user.label().to_owned(),
          created_at:         Utc::now(),
        })
        .collect(),
    )
  }

  /// Book a complete form in one step.
  ///
  /// The store-free checks run first, so an invalid form never opens a
  /// subscription. The form is then loaded, its view awaited, and committed.
  pub async fn submit(&mut self, form: BookingForm) -> Result<Vec<Reservation>> {
    if let Err(e) = form.validate(&self.identity.state()) {
      tracing::info!(error = %e, "booking rejected");
      return Err(e.into());
    }
    self.load(form).await?;
    self.view.ready().await?;
    self.commit().await
  }

  /// Validate and persist the form: one independent insertion per slot, all
  /// dispatched at once.
  ///
  /// Succeeds only if every insertion succeeds. Insertions are not rolled
  /// back when a sibling fails, so a failed commit may leave some of its
  /// slots booked; the first failure in slot order is returned.
  ///
  /// On success the slot, group and teacher selections are cleared while
  /// kind, resource and date are kept.
  pub async fn commit(&mut self) -> Result<Vec<Reservation>> {
    let records = match self.prepare() {
      Ok(records) => records,
      Err(e) => {
        tracing::info!(error = %e, "booking rejected");
        return Err(e);
      }
    };

    let requested = records.len();
    let handles: Vec<_> = records
      .into_iter()
      .map(|record| {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move { store.insert(record).await })
      })
      .collect();

    let mut saved     = Vec::with_capacity(requested);
    let mut first_err = None;
    for handle in handles {
      let outcome = match handle.await {
        Ok(Ok(reservation)) => Ok(reservation),
        Ok(Err(e)) => Err(Error::transport(e)),
        Err(join) => Err(Error::transport(join)),
      };
      match outcome {
        Ok(reservation) => saved.push(reservation),
        Err(e) => {
          first_err.get_or_insert(e);
        }
      }
    }

    if let Some(e) = first_err {
      tracing::warn!(
        requested,
        inserted = saved.len(),
        error = %e,
        "booking partially applied; inserted slots were kept"
      );
      return Err(e);
    }

    tracing::info!(
      kind = %self.form.kind,
      resource_id = %self.form.resource_id,
      slots = requested,
      "booking committed"
    );
    self.form.slots.clear();
    self.form.group.clear();
    self.form.teacher.clear();
    Ok(saved)
  }
}
