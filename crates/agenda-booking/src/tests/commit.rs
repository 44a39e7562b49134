use std::{sync::Arc, time::Duration};

use agenda_core::catalog::ResourceKind;

use super::support::*;
use crate::{BookingForm, Coordinator, Error, ValidationError};

#[tokio::test]
async fn booking_scenario_creates_one_reservation() {
  let store = ScriptedStore::new().await;
  let mut c = coordinator_on(
    &store,
    signed_in("u-alice", "Alice"),
    ResourceKind::Space,
    "informatica1",
    march(10),
  )
  .await;
  c.toggle_slot(FIRST, true);
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");

  let saved = c.commit().await.unwrap();
  assert_eq!(saved.len(), 1);
  let r = &saved[0];
  assert!(!r.id.is_empty());
  assert_eq!(r.kind, ResourceKind::Space);
  assert_eq!(r.resource_id, "informatica1");
  assert_eq!(r.date, march(10));
  assert_eq!(r.slot, FIRST);
  assert_eq!(r.group_label.as_deref(), Some("1ª Série A"));
  assert_eq!(r.teacher, "ANY_TEACHER");
  assert_eq!(r.owner_id, "u-alice");
  assert_eq!(r.owner_display_name, "Alice");

  within(c.view().wait_until(|occupied| occupied.contains(FIRST)))
    .await
    .unwrap();
  assert_eq!(store.all(ResourceKind::Space).await, saved);
}

#[tokio::test]
async fn successful_commit_resets_transient_selection_only() {
  let store = ScriptedStore::new().await;
  let mut c = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Space,
    "biblioteca",
    march(10),
  )
  .await;
  c.toggle_slot(FIRST, true);
  c.toggle_slot(SECOND, true);
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");
  c.commit().await.unwrap();

  let form = c.form();
  assert!(form.slots.is_empty());
  assert!(form.group.is_empty());
  assert!(form.teacher.is_empty());
  assert_eq!(form.resource_id, "biblioteca");
  assert_eq!(form.date, Some(march(10)));
  assert_eq!(form.kind, ResourceKind::Space);
}

#[tokio::test]
async fn duplicate_booking_is_rejected_without_writes() {
  let store = ScriptedStore::new().await;
  let mut c = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Space,
    "informatica1",
    march(10),
  )
  .await;
  c.toggle_slot(FIRST, true);
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");
  c.commit().await.unwrap();
  within(c.view().wait_until(|o| o.contains(FIRST))).await.unwrap();
  let attempts = store.insert_attempts();

  c.toggle_slot(SECOND, true);
  c.toggle_slot(FIRST, true);
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");
  let err = c.commit().await.unwrap_err();

  assert!(matches!(&err, Error::Conflict(slots) if slots == &[FIRST.to_string()]));
  assert_eq!(store.insert_attempts(), attempts);
  // A rejected commit keeps the selection so the user can adjust it.
  assert_eq!(c.form().slots, [SECOND, FIRST]);
}

#[tokio::test]
async fn conflict_list_is_exactly_the_intersection() {
  let store = ScriptedStore::new().await;
  store.seed(ResourceKind::Equipment, "projetorEpson", march(12), FIRST, "other").await;
  store.seed(ResourceKind::Equipment, "projetorEpson", march(12), SECOND, "other").await;

  let mut c = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Equipment,
    "projetorEpson",
    march(12),
  )
  .await;
  within(c.view().wait_until(|o| o.len() == 2)).await.unwrap();

  c.toggle_slot(FIRST, true);
  c.toggle_slot(THIRD, true);
  c.set_teacher("ANY_TEACHER");
  let err = c.commit().await.unwrap_err();
  assert!(matches!(err, Error::Conflict(slots) if slots == vec![FIRST.to_string()]));
  assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn signed_out_user_cannot_book() {
  let store = ScriptedStore::new().await;
  let mut c =
    coordinator_on(&store, signed_out(), ResourceKind::Space, "biblioteca", march(10)).await;
  // Nothing else is filled in either: identity is checked first.
  let err = c.commit().await.unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::NotSignedIn)));
  assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn incomplete_requests_write_nothing() {
  let store = ScriptedStore::new().await;

  // No slots.
  let mut c = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Space,
    "biblioteca",
    march(10),
  )
  .await;
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");
  assert!(matches!(
    c.commit().await,
    Err(Error::Validation(ValidationError::Incomplete))
  ));

  // No teacher.
  c.toggle_slot(FIRST, true);
  c.set_teacher("");
  assert!(matches!(
    c.commit().await,
    Err(Error::Validation(ValidationError::Incomplete))
  ));

  // No date.
  c.set_teacher("ANY_TEACHER");
  c.set_date(None).await.unwrap();
  assert!(matches!(
    c.commit().await,
    Err(Error::Validation(ValidationError::Incomplete))
  ));

  // No resource.
  let mut c = Coordinator::new(Arc::clone(&store), signed_in("u1", "Alice"));
  c.set_date(Some(march(10))).await.unwrap();
  c.toggle_slot(FIRST, true);
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");
  assert!(matches!(
    c.commit().await,
    Err(Error::Validation(ValidationError::Incomplete))
  ));

  assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn spaces_need_a_group_but_equipment_does_not() {
  let store = ScriptedStore::new().await;

  let mut space = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Space,
    "labCiencias",
    march(10),
  )
  .await;
  space.toggle_slot(FIRST, true);
  space.set_teacher("ANY_TEACHER");
  assert!(matches!(
    space.commit().await,
    Err(Error::Validation(ValidationError::MissingGroup))
  ));
  assert_eq!(store.insert_attempts(), 0);

  let mut gear = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Equipment,
    "caixaSom",
    march(10),
  )
  .await;
  gear.toggle_slot(FIRST, true);
  gear.set_group("ignored for equipment");
  gear.set_teacher("ANY_TEACHER");
  let saved = gear.commit().await.unwrap();
  assert_eq!(saved[0].group_label, None);
  assert_eq!(saved[0].kind, ResourceKind::Equipment);
}

#[tokio::test]
async fn missing_fields_are_reported_before_missing_group() {
  let store = ScriptedStore::new().await;
  let mut c = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Space,
    "labCiencias",
    march(10),
  )
  .await;
  c.toggle_slot(FIRST, true);
  assert!(matches!(
    c.commit().await,
    Err(Error::Validation(ValidationError::Incomplete))
  ));
}

#[tokio::test]
async fn partial_failure_keeps_inserted_slots_and_reports_error() {
  let store = ScriptedStore::new().await;
  store.fail_inserts_for(SECOND);

  let mut c = coordinator_on(
    &store,
    signed_in("u1", "Alice"),
    ResourceKind::Equipment,
    "smartvSamsung",
    march(11),
  )
  .await;
  c.toggle_slot(FIRST, true);
  c.toggle_slot(SECOND, true);
  c.toggle_slot(THIRD, true);
  c.set_teacher("ANY_TEACHER");

  let err = c.commit().await.unwrap_err();
  assert!(matches!(err, Error::Transport(_)));
  assert_eq!(store.insert_attempts(), 3);

  let mut kept: Vec<_> = store
    .all(ResourceKind::Equipment)
    .await
    .into_iter()
    .map(|r| r.slot)
    .collect();
  kept.sort();
  assert_eq!(kept, [FIRST, THIRD]);
  // The form is only reset on full success.
  assert_eq!(c.form().slots.len(), 3);
}

#[tokio::test]
async fn sequential_bookings_never_share_a_slot() {
  let store = ScriptedStore::new().await;
  let mut alice = coordinator_on(
    &store,
    signed_in("alice", "Alice"),
    ResourceKind::Space,
    "salaVideo",
    march(14),
  )
  .await;
  let mut bob = coordinator_on(
    &store,
    signed_in("bob", "Bob"),
    ResourceKind::Space,
    "salaVideo",
    march(14),
  )
  .await;

  alice.toggle_slot(FIRST, true);
  alice.set_group("1ª Série A");
  alice.set_teacher("ANY_TEACHER");
  alice.commit().await.unwrap();

  within(bob.view().wait_until(|o| o.contains(FIRST))).await.unwrap();
  bob.toggle_slot(FIRST, true);
  bob.toggle_slot(SECOND, true);
  bob.set_group("2ª Série A");
  bob.set_teacher("ANY_TEACHER");
  assert!(matches!(bob.commit().await, Err(Error::Conflict(_))));

  bob.toggle_slot(FIRST, false);
  bob.commit().await.unwrap();

  let rows = store.all(ResourceKind::Space).await;
  assert_eq!(rows.len(), 2);
  assert_eq!(rows.iter().filter(|r| r.slot == FIRST).count(), 1);
}

#[tokio::test]
async fn stale_view_lets_concurrent_bookings_double_book() {
  let store = ScriptedStore::new().await;
  let mut alice = coordinator_on(
    &store,
    signed_in("alice", "Alice"),
    ResourceKind::Space,
    "biblioteca",
    march(17),
  )
  .await;

  // Bob's view has not received its first snapshot when both commit.
  store.delay_first_snapshot("biblioteca", Duration::from_secs(5));
  let mut bob = Coordinator::new(Arc::clone(&store), signed_in("bob", "Bob"));
  bob.set_resource("biblioteca").await.unwrap();
  bob.set_date(Some(march(17))).await.unwrap();

  for c in [&mut alice, &mut bob] {
    c.toggle_slot(FIRST, true);
    c.set_group("1ª Série A");
    c.set_teacher("ANY_TEACHER");
  }
  alice.commit().await.unwrap();
  bob.commit().await.unwrap();

  let rows = store.all(ResourceKind::Space).await;
  assert_eq!(rows.iter().filter(|r| r.slot == FIRST).count(), 2);
}

#[tokio::test]
async fn toggling_slots_is_idempotent_and_ordered() {
  let store = ScriptedStore::new().await;
  let mut c = Coordinator::new(store, signed_in("u1", "Alice"));
  c.toggle_slot(THIRD, true);
  c.toggle_slot(FIRST, true);
  c.toggle_slot(THIRD, true);
  assert_eq!(c.form().slots, [THIRD, FIRST]);
  c.toggle_slot(THIRD, false);
  c.toggle_slot(SECOND, false);
  assert_eq!(c.form().slots, [FIRST]);
}

#[tokio::test]
async fn loaded_form_is_checked_against_its_own_view() {
  let store = ScriptedStore::new().await;
  store.seed(ResourceKind::Equipment, "caixaSom", march(12), SECOND, "u-bob").await;

  let mut c = Coordinator::new(Arc::clone(&store), signed_in("u-alice", "Alice"));
  c.load(BookingForm {
    kind:        ResourceKind::Equipment,
    resource_id: "caixaSom".into(),
    date:        Some(march(12)),
    slots:       vec![FIRST.into(), SECOND.into(), FIRST.into()],
    group:       String::new(),
    teacher:     "ANY_TEACHER".into(),
  })
  .await
  .unwrap();
  assert_eq!(c.form().slots, [FIRST, SECOND]);
  within(c.view().ready()).await.unwrap();

  let err = c.commit().await.unwrap_err();
  assert!(matches!(err, Error::Conflict(ref slots) if slots == &[SECOND.to_owned()]));
  assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn lost_feed_blocks_commit_instead_of_hiding_conflicts() {
  let store = ScriptedStore::new().await;
  store.seed(ResourceKind::Space, "biblioteca", march(10), FIRST, "u-bob").await;
  store.break_feeds_after_first();

  let mut c = Coordinator::new(Arc::clone(&store), signed_in("u-alice", "Alice"));
  c.set_resource("biblioteca").await.unwrap();
  c.set_date(Some(march(10))).await.unwrap();
  // Wait for the feed to fail; the view is emptied when it does.
  let lost = within(c.view().wait_until(|_| false)).await.unwrap_err();
  assert!(matches!(lost, Error::Transport(_)));
  assert!(c.view().occupied().is_empty());

  c.toggle_slot(FIRST, true);
  c.set_group("1ª Série A");
  c.set_teacher("ANY_TEACHER");
  assert!(matches!(c.commit().await, Err(Error::Transport(_))));

  assert_eq!(store.insert_attempts(), 0);
  assert_eq!(store.all(ResourceKind::Space).await.len(), 1);
}

#[tokio::test]
async fn submit_validates_before_touching_the_store() {
  let store = ScriptedStore::new().await;
  store.refuse_subscriptions();
  let incomplete = BookingForm {
    kind:        ResourceKind::Space,
    resource_id: "biblioteca".into(),
    date:        Some(march(10)),
    slots:       vec![FIRST.into()],
    ..BookingForm::default()
  };

  let mut anonymous = Coordinator::new(Arc::clone(&store), signed_out());
  assert!(matches!(
    anonymous.submit(incomplete.clone()).await,
    Err(Error::Validation(ValidationError::NotSignedIn))
  ));

  let mut alice = Coordinator::new(Arc::clone(&store), signed_in("u-alice", "Alice"));
  assert!(matches!(
    alice.submit(incomplete.clone()).await,
    Err(Error::Validation(ValidationError::Incomplete))
  ));
  assert!(!alice.view().is_active());

  let no_group = BookingForm { teacher: "ANY_TEACHER".into(), ..incomplete };
  assert!(matches!(
    alice.submit(no_group.clone()).await,
    Err(Error::Validation(ValidationError::MissingGroup))
  ));

  // A valid form does reach the store, which here refuses it.
  let valid = BookingForm { group: "1ª Série A".into(), ..no_group };
  assert!(matches!(alice.submit(valid).await, Err(Error::Transport(_))));
  assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn submit_books_a_whole_form() {
  let store = ScriptedStore::new().await;
  store.seed(ResourceKind::Equipment, "projetorBenq", march(14), THIRD, "u-bob").await;

  let mut c = Coordinator::new(Arc::clone(&store), signed_in("u-alice", "Alice"));
  let form = BookingForm {
    kind:        ResourceKind::Equipment,
    resource_id: "projetorBenq".into(),
    date:        Some(march(14)),
    slots:       vec![FIRST.into(), SECOND.into()],
    group:       String::new(),
    teacher:     "ANY_TEACHER".into(),
  };
  let saved = c.submit(form.clone()).await.unwrap();
  assert_eq!(saved.len(), 2);

  // A fresh coordinator, so its first snapshot already holds both bookings.
  let mut late = Coordinator::new(Arc::clone(&store), signed_in("u-carol", "Carol"));
  let clash = BookingForm { slots: vec![THIRD.into(), SECOND.into()], ..form };
  let err = late.submit(clash).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Conflict(ref slots) if slots == &[THIRD.to_owned(), SECOND.to_owned()]
  ));
}
