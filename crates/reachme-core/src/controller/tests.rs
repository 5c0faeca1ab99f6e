use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::sleep;

use super::*;
use crate::models::{DeviceKey, StoredPreference};
use crate::store::{StoreError, StoreResult};

const TEST_DEVICE: &str = "device_1700000000000_testkey01";

#[derive(Debug)]
struct FixedIdentity;

impl DeviceIdentity for FixedIdentity {
    fn device_key(&self) -> DeviceKey {
        DeviceKey::from(TEST_DEVICE)
    }
}

#[derive(Clone, Default)]
struct FakeStore {
    inner: Arc<FakeStoreInner>,
}

#[derive(Default)]
struct FakeStoreInner {
    records: Mutex<HashMap<String, bool>>,
    fail_fetch: AtomicBool,
    fail_upsert: AtomicBool,
    fetch_calls: AtomicUsize,
    upserts: Mutex<Vec<(String, bool)>>,
    /// Per-call (delay, fail) overrides, consumed in call order.
    upsert_script: Mutex<VecDeque<(Duration, bool)>>,
}

impl FakeStore {
    fn with_record(show_details: bool) -> Self {
        let store = Self::default();
        store
            .inner
            .records
            .lock()
            .unwrap()
            .insert(TEST_DEVICE.to_string(), show_details);
        store
    }

    fn failing_fetch() -> Self {
        let store = Self::default();
        store.inner.fail_fetch.store(true, Ordering::SeqCst);
        store
    }

    fn set_upsert_failing(&self, failing: bool) {
        self.inner.fail_upsert.store(failing, Ordering::SeqCst);
    }

    fn script_upserts(&self, script: impl IntoIterator<Item = (Duration, bool)>) {
        self.inner.upsert_script.lock().unwrap().extend(script);
    }

    fn stored(&self) -> Option<bool> {
        self.inner.records.lock().unwrap().get(TEST_DEVICE).copied()
    }

    fn fetch_calls(&self) -> usize {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }

    fn upserts(&self) -> Vec<(String, bool)> {
        self.inner.upserts.lock().unwrap().clone()
    }
}

impl PreferenceStore for FakeStore {
    async fn fetch(&self, user_key: &str) -> StoreResult<Option<StoredPreference>> {
        self.inner.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Api("network unreachable".to_string()));
        }
        let records = self.inner.records.lock().unwrap();
        Ok(records
            .get(user_key)
            .map(|&show_details| StoredPreference { show_details }))
    }

    async fn upsert(&self, user_key: &str, show_details: bool) -> StoreResult<()> {
        let scripted = self.inner.upsert_script.lock().unwrap().pop_front();
        let (delay, fail) =
            scripted.unwrap_or((Duration::ZERO, self.inner.fail_upsert.load(Ordering::SeqCst)));
        if !delay.is_zero() {
            sleep(delay).await;
        }
        if fail {
            return Err(StoreError::Api("connection reset".to_string()));
        }
        self.inner
            .upserts
            .lock()
            .unwrap()
            .push((user_key.to_string(), show_details));
        self.inner
            .records
            .lock()
            .unwrap()
            .insert(user_key.to_string(), show_details);
        Ok(())
    }
}

fn controller(store: FakeStore) -> PreferenceController<FixedIdentity, FakeStore> {
    PreferenceController::new(FixedIdentity, store)
}

async fn loaded_controller(store: FakeStore) -> PreferenceController<FixedIdentity, FakeStore> {
    let controller = controller(store);
    controller.initialize().await;
    controller
}

#[test]
fn pin_must_match_exactly() {
    assert!(verify_pin("26112002"));
    assert!(!verify_pin(""));
    assert!(!verify_pin("2611200"));
    assert!(!verify_pin("261120021"));
    assert!(!verify_pin(" 26112002"));
    assert!(!verify_pin("26112002 "));
    assert!(!verify_pin("00000000"));
}

#[tokio::test]
async fn state_before_initialize_is_loading() {
    let controller = controller(FakeStore::default());
    let state = controller.state();
    assert!(state.loading);
    assert_eq!(state.preferences, None);
    assert!(!state.show_details());
}

#[tokio::test]
async fn fresh_device_defaults_to_visible() {
    let controller = loaded_controller(FakeStore::default()).await;

    let state = controller.state();
    assert_eq!(
        state.preferences,
        Some(Preferences::new(DeviceKey::from(TEST_DEVICE), true))
    );
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn stored_value_is_adopted() {
    let controller = loaded_controller(FakeStore::with_record(false)).await;

    let state = controller.state();
    assert!(!state.show_details());
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn load_failure_falls_back_to_visible() {
    let controller = loaded_controller(FakeStore::failing_fetch()).await;

    let state = controller.state();
    assert!(state.show_details());
    assert!(!state.loading);
    assert!(state
        .error
        .as_deref()
        .is_some_and(|error| error.contains("network unreachable")));
}

#[tokio::test]
async fn initialize_only_loads_once() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;
    controller.initialize().await;

    assert_eq!(store.fetch_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn loading_visible_does_not_start_timer() {
    let controller = loaded_controller(FakeStore::with_record(true)).await;

    assert!(!controller.state().auto_logout_active);
    sleep(Duration::from_secs(120)).await;
    assert!(controller.state().show_details());
}

#[tokio::test(start_paused = true)]
async fn turning_on_hides_details_after_sixty_seconds() {
    let controller = loaded_controller(FakeStore::with_record(false)).await;

    controller.request_preference_change(true).await.unwrap();
    let state = controller.state();
    assert!(state.show_details());
    assert!(state.auto_logout_active);
    assert_eq!(state.auto_logout_countdown, AUTO_LOGOUT_SECONDS);

    sleep(Duration::from_millis(59_500)).await;
    let state = controller.state();
    assert!(state.show_details());
    assert!(state.auto_logout_active);
    assert_eq!(state.auto_logout_countdown, 1);

    sleep(Duration::from_secs(1)).await;
    let state = controller.state();
    assert!(!state.show_details());
    assert!(!state.auto_logout_active);
    assert_eq!(state.auto_logout_countdown, 0);
}

#[tokio::test(start_paused = true)]
async fn countdown_decrements_each_second() {
    let controller = loaded_controller(FakeStore::default()).await;

    controller.request_preference_change(true).await.unwrap();
    sleep(Duration::from_millis(10_500)).await;

    assert_eq!(controller.state().auto_logout_countdown, 50);
}

#[tokio::test(start_paused = true)]
async fn nothing_changes_after_expiry() {
    let controller = loaded_controller(FakeStore::default()).await;

    controller.request_preference_change(true).await.unwrap();
    sleep(Duration::from_millis(60_500)).await;

    let mut updates = controller.subscribe();
    let expired = updates.borrow_and_update().clone();
    assert!(!expired.show_details());

    sleep(Duration::from_secs(300)).await;
    assert!(!updates.has_changed().unwrap());
    assert_eq!(controller.state(), expired);
}

#[tokio::test(start_paused = true)]
async fn turning_off_cancels_timer() {
    let controller = loaded_controller(FakeStore::default()).await;

    controller.request_preference_change(true).await.unwrap();
    sleep(Duration::from_millis(30_500)).await;
    assert_eq!(controller.state().auto_logout_countdown, 30);

    controller.request_preference_change(false).await.unwrap();
    let mut updates = controller.subscribe();
    let state = updates.borrow_and_update().clone();
    assert!(!state.show_details());
    assert!(!state.auto_logout_active);
    assert_eq!(state.auto_logout_countdown, 0);

    sleep(Duration::from_secs(40)).await;
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn turning_on_again_restarts_timer() {
    let controller = loaded_controller(FakeStore::default()).await;

    controller.request_preference_change(true).await.unwrap();
    sleep(Duration::from_millis(30_500)).await;
    controller.request_preference_change(true).await.unwrap();
    assert_eq!(controller.state().auto_logout_countdown, AUTO_LOGOUT_SECONDS);

    // Past the first timer's deadline.
    sleep(Duration::from_millis(30_250)).await;
    let state = controller.state();
    assert!(state.show_details());
    assert!(state.auto_logout_active);
    assert_eq!(state.auto_logout_countdown, 30);

    sleep(Duration::from_secs(30)).await;
    let state = controller.state();
    assert!(!state.show_details());
    assert!(!state.auto_logout_active);
}

#[tokio::test(start_paused = true)]
async fn off_then_on_does_not_inherit_old_deadline() {
    let controller = loaded_controller(FakeStore::default()).await;

    controller.request_preference_change(true).await.unwrap();
    sleep(Duration::from_millis(30_500)).await;
    controller.request_preference_change(false).await.unwrap();
    sleep(Duration::from_secs(15)).await;
    controller.request_preference_change(true).await.unwrap();

    // 60.5s after the first arming, 15s into the second.
    sleep(Duration::from_secs(15)).await;
    assert!(controller.state().show_details());

    sleep(Duration::from_secs(46)).await;
    assert!(!controller.state().show_details());
}

#[tokio::test(start_paused = true)]
async fn cancel_without_timer_changes_nothing() {
    let controller = loaded_controller(FakeStore::default()).await;
    let mut updates = controller.subscribe();
    let before = updates.borrow_and_update().clone();

    controller.cancel_auto_logout();
    controller.cancel_auto_logout();

    assert!(!updates.has_changed().unwrap());
    assert_eq!(controller.state(), before);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_timer_but_keeps_visibility() {
    let controller = loaded_controller(FakeStore::default()).await;

    controller.request_preference_change(true).await.unwrap();
    sleep(Duration::from_millis(10_500)).await;
    controller.cancel_auto_logout();

    let state = controller.state();
    assert!(state.show_details());
    assert!(!state.auto_logout_active);
    assert_eq!(state.auto_logout_countdown, 0);

    sleep(Duration::from_secs(60)).await;
    assert!(controller.state().show_details());
}

#[tokio::test]
async fn change_is_saved_under_device_key() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;

    controller.request_preference_change(false).await.unwrap();

    assert_eq!(store.upserts(), vec![(TEST_DEVICE.to_string(), false)]);
    assert_eq!(controller.state().error, None);
}

#[tokio::test]
async fn change_is_visible_before_save_completes() {
    let controller = loaded_controller(FakeStore::default()).await;

    let saving = controller.request_preference_change(false);
    assert!(!controller.state().show_details());
    saving.await.unwrap();
}

#[tokio::test]
async fn save_failure_keeps_local_change() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;
    store.set_upsert_failing(true);

    controller.request_preference_change(false).await.unwrap();

    let state = controller.state();
    assert!(!state.show_details());
    assert!(state
        .error
        .as_deref()
        .is_some_and(|error| error.contains("connection reset")));
}

#[tokio::test(start_paused = true)]
async fn save_failure_does_not_cancel_timer() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;
    store.set_upsert_failing(true);

    controller.request_preference_change(true).await.unwrap();
    let state = controller.state();
    assert!(state.error.is_some());
    assert!(state.auto_logout_active);

    sleep(Duration::from_millis(60_500)).await;
    assert!(!controller.state().show_details());
}

#[tokio::test]
async fn next_change_clears_previous_error() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;

    store.set_upsert_failing(true);
    controller.request_preference_change(false).await.unwrap();
    assert!(controller.state().error.is_some());

    store.set_upsert_failing(false);
    let saving = controller.request_preference_change(false);
    assert_eq!(controller.state().error, None);
    saving.await.unwrap();
    assert_eq!(controller.state().error, None);
}

#[tokio::test]
async fn change_before_load_survives_load() {
    let store = FakeStore::with_record(true);
    store.set_upsert_failing(true);
    let controller = controller(store);

    controller.request_preference_change(false).await.unwrap();
    controller.initialize().await;

    let state = controller.state();
    assert!(!state.show_details());
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_cancels_timer() {
    let controller = loaded_controller(FakeStore::default()).await;
    let updates = controller.subscribe();

    controller.request_preference_change(true).await.unwrap();
    drop(controller);

    sleep(Duration::from_secs(61)).await;
    let state = updates.borrow().clone();
    assert!(state.show_details());
    assert!(!state.auto_logout_active);
}

#[tokio::test(start_paused = true)]
async fn saves_complete_in_request_order() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;
    store.script_upserts([(Duration::from_millis(500), false)]);

    let first = controller.request_preference_change(true);
    let second = controller.request_preference_change(false);
    first.await.unwrap();
    second.await.unwrap();

    assert!(!controller.state().show_details());
    assert_eq!(store.stored(), Some(false));
    assert_eq!(
        store.upserts(),
        vec![
            (TEST_DEVICE.to_string(), true),
            (TEST_DEVICE.to_string(), false)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn superseded_save_failure_is_not_reported() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;
    store.script_upserts([(Duration::from_millis(500), true)]);

    let first = controller.request_preference_change(true);
    let second = controller.request_preference_change(false);
    first.await.unwrap();
    second.await.unwrap();

    let state = controller.state();
    assert_eq!(state.error, None);
    assert!(!state.show_details());
    assert_eq!(store.stored(), Some(false));
}

#[tokio::test(start_paused = true)]
async fn latest_save_failure_is_reported_after_slow_success() {
    let store = FakeStore::default();
    let controller = loaded_controller(store.clone()).await;
    store.script_upserts([(Duration::from_millis(500), false), (Duration::ZERO, true)]);

    let first = controller.request_preference_change(true);
    let second = controller.request_preference_change(false);
    first.await.unwrap();
    second.await.unwrap();

    assert!(controller
        .state()
        .error
        .as_deref()
        .is_some_and(|error| error.contains("connection reset")));
    assert_eq!(store.stored(), Some(true));
}
