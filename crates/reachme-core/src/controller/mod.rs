//! Detail visibility controller.
//!
//! Owns the `show_details` flag, the PIN check guarding changes to it, and the
//! auto-logout timer that hides details again [`AUTO_LOGOUT_SECONDS`] after
//! they are turned on. Changes are applied locally first and persisted to a
//! [`PreferenceStore`] afterwards by a single writer task, one save at a time
//! in request order. Persistence failures are reported through
//! [`PreferenceState::error`] and never roll the local value back; only the
//! most recent request may report one.
//!
//! The auto-logout timer is two tokio tasks started at the same instant: a
//! one-second ticker that only drives the countdown display, and a one-shot
//! expiry that hides the details. Both live in a single timer slot. Arming a
//! new timer or cancelling always clears the slot first and bumps its
//! generation, so a callback from a superseded timer is ignored even if it
//! was already running when it was aborted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant};

use crate::device::DeviceIdentity;
use crate::models::{DeviceKey, Preferences, DEFAULT_SHOW_DETAILS};
use crate::store::PreferenceStore;

/// PIN required before visibility may change.
pub const DEFAULT_PIN: &str = "26112002";

/// Seconds details stay visible after being turned on.
pub const AUTO_LOGOUT_SECONDS: u32 = 60;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Exact, case-sensitive comparison against [`DEFAULT_PIN`].
pub fn verify_pin(candidate: &str) -> bool {
    candidate == DEFAULT_PIN
}

/// Snapshot of everything a UI needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceState {
    /// `None` until the first load finishes or a change is requested.
    pub preferences: Option<Preferences>,
    pub loading: bool,
    /// Most recent load or save failure.
    pub error: Option<String>,
    pub auto_logout_active: bool,
    /// Seconds left before auto-logout. Display only.
    pub auto_logout_countdown: u32,
}

impl Default for PreferenceState {
    fn default() -> Self {
        Self {
            preferences: None,
            loading: true,
            error: None,
            auto_logout_active: false,
            auto_logout_countdown: 0,
        }
    }
}

impl PreferenceState {
    pub fn show_details(&self) -> bool {
        self.preferences
            .as_ref()
            .is_some_and(|preferences| preferences.show_details)
    }
}

pub struct PreferenceController<I, S> {
    identity: I,
    store: Arc<S>,
    shared: Arc<Shared>,
    initialized: AtomicBool,
    saves: OnceLock<mpsc::UnboundedSender<SaveRequest>>,
}

impl<I: DeviceIdentity, S: PreferenceStore> PreferenceController<I, S> {
    pub fn new(identity: I, store: S) -> Self {
        let (state, _) = watch::channel(PreferenceState::default());
        Self {
            identity,
            store: Arc::new(store),
            shared: Arc::new(Shared {
                state,
                timer: Mutex::new(TimerSlot::default()),
                latest_save: AtomicU64::new(0),
            }),
            initialized: AtomicBool::new(false),
            saves: OnceLock::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> PreferenceState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change, including countdown ticks.
    pub fn subscribe(&self) -> watch::Receiver<PreferenceState> {
        self.shared.state.subscribe()
    }

    /// Load the stored preference for this device.
    ///
    /// Only the first call does anything. A missing record or a failed load
    /// both leave details visible; a failed load also sets `error`.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("Preference controller already initialized");
            return;
        }
        self.shared.state.send_modify(|state| state.loading = true);

        let user_key = self.identity.device_key();
        let (show_details, error) = match self.store.fetch(user_key.as_str()).await {
            Ok(Some(stored)) => (stored.show_details, None),
            Ok(None) => {
                tracing::debug!("No stored preference for {}, using default", user_key);
                (DEFAULT_SHOW_DETAILS, None)
            }
            Err(error) => {
                tracing::error!("Error loading preferences: {}", error);
                (DEFAULT_SHOW_DETAILS, Some(error.to_string()))
            }
        };

        self.shared.state.send_modify(|state| {
            // A change requested while loading wins over the stored value.
            if state.preferences.is_none() {
                state.preferences = Some(Preferences::new(user_key, show_details));
                state.error = error;
            }
            state.loading = false;
        });
    }

    pub fn verify_pin(&self, candidate: &str) -> bool {
        verify_pin(candidate)
    }

    /// Apply a visibility change the caller has already PIN-checked.
    ///
    /// The local state is updated before this returns. Turning details on
    /// (re)arms the auto-logout timer; turning them off cancels it. The new
    /// value is then queued for saving: the returned handle completes once
    /// this save attempt is done and may simply be dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_preference_change(&self, show_details: bool) -> JoinHandle<()> {
        let user_key = self.identity.device_key();
        let (done, saved) = oneshot::channel();
        {
            let mut slot = self.shared.timer_slot();
            self.shared.clear_timer(&mut slot);
            self.shared.state.send_modify(|state| {
                match state.preferences.as_mut() {
                    Some(preferences) => preferences.show_details = show_details,
                    None => {
                        state.preferences = Some(Preferences::new(user_key.clone(), show_details));
                    }
                }
                state.error = None;
            });
            if show_details {
                arm_auto_logout(&self.shared, &mut slot);
            }

            // Queued under the slot lock so queue order matches sequence order.
            let sequence = self.shared.latest_save.fetch_add(1, Ordering::SeqCst) + 1;
            let request = SaveRequest {
                sequence,
                user_key,
                show_details,
                done,
            };
            if self.save_queue().send(request).is_err() {
                tracing::error!("Preference writer stopped, change not saved");
                self.shared.state.send_modify(|state| {
                    state.error = Some("Preference writer stopped".to_string());
                });
            }
        }
        tracing::info!("Contact details turned {}", if show_details { "on" } else { "off" });

        tokio::spawn(async move {
            let _ = saved.await;
        })
    }

    /// Stop the auto-logout timer, if any, without touching visibility.
    pub fn cancel_auto_logout(&self) {
        self.shared.cancel_auto_logout();
    }

    fn save_queue(&self) -> &mpsc::UnboundedSender<SaveRequest> {
        self.saves.get_or_init(|| {
            let (sender, requests) = mpsc::unbounded_channel();
            tokio::spawn(run_writer(
                Arc::clone(&self.store),
                Arc::clone(&self.shared),
                requests,
            ));
            sender
        })
    }
}

impl<I, S> Drop for PreferenceController<I, S> {
    fn drop(&mut self) {
        self.shared.cancel_auto_logout();
    }
}

struct Shared {
    state: watch::Sender<PreferenceState>,
    timer: Mutex<TimerSlot>,
    /// Sequence of the newest queued save. Bumped and compared under the
    /// timer slot lock.
    latest_save: AtomicU64,
}

struct SaveRequest {
    sequence: u64,
    user_key: DeviceKey,
    show_details: bool,
    done: oneshot::Sender<()>,
}

/// At most one pending timer. `generation` changes whenever the pending
/// timer is replaced, cancelled, or fires.
#[derive(Default)]
struct TimerSlot {
    generation: u64,
    pending: Option<AutoLogoutTimer>,
}

struct AutoLogoutTimer {
    ticker: JoinHandle<()>,
    expiry: JoinHandle<()>,
}

impl AutoLogoutTimer {
    fn cancel(self) {
        self.ticker.abort();
        self.expiry.abort();
    }
}

impl Shared {
    // Lock order: timer slot, then state.
    fn timer_slot(&self) -> MutexGuard<'_, TimerSlot> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_auto_logout(&self) {
        let mut slot = self.timer_slot();
        self.clear_timer(&mut slot);
    }

    fn clear_timer(&self, slot: &mut TimerSlot) {
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(timer) = slot.pending.take() {
            timer.cancel();
        }
        self.state.send_if_modified(|state| {
            let changed = state.auto_logout_active || state.auto_logout_countdown != 0;
            state.auto_logout_active = false;
            state.auto_logout_countdown = 0;
            changed
        });
    }

    fn record_save_error(&self, sequence: u64, message: String) {
        let slot = self.timer_slot();
        if self.latest_save.load(Ordering::SeqCst) == sequence {
            self.state.send_modify(|state| state.error = Some(message));
        } else {
            tracing::debug!("Ignoring failure of superseded save {}", sequence);
        }
        drop(slot);
    }

    /// Returns whether the ticker should keep running.
    fn tick(&self, generation: u64) -> bool {
        let slot = self.timer_slot();
        if slot.generation != generation {
            return false;
        }
        let mut remaining = 0;
        self.state.send_modify(|state| {
            state.auto_logout_countdown = state.auto_logout_countdown.saturating_sub(1);
            remaining = state.auto_logout_countdown;
        });
        drop(slot);
        remaining > 0
    }

    fn expire(&self, generation: u64) {
        let mut slot = self.timer_slot();
        if slot.generation != generation {
            return;
        }
        slot.generation = slot.generation.wrapping_add(1);
        // Running inside the expiry task itself; only the ticker needs stopping.
        if let Some(timer) = slot.pending.take() {
            timer.ticker.abort();
        }
        self.state.send_modify(|state| {
            if let Some(preferences) = state.preferences.as_mut() {
                preferences.show_details = false;
            }
            state.auto_logout_active = false;
            state.auto_logout_countdown = 0;
        });
        tracing::info!("Auto-logout expired, contact details hidden");
    }
}

/// Start a fresh timer. The slot must have just been cleared.
fn arm_auto_logout(shared: &Arc<Shared>, slot: &mut TimerSlot) {
    let generation = slot.generation;
    let started = Instant::now();
    let deadline = started + Duration::from_secs(u64::from(AUTO_LOGOUT_SECONDS));

    shared.state.send_modify(|state| {
        state.auto_logout_active = true;
        state.auto_logout_countdown = AUTO_LOGOUT_SECONDS;
    });

    let ticker = tokio::spawn(run_countdown(Arc::clone(shared), generation, started));
    let expiry = tokio::spawn(run_expiry(Arc::clone(shared), generation, deadline));
    slot.pending = Some(AutoLogoutTimer { ticker, expiry });
}

/// Saves queued changes one at a time until the controller is dropped.
async fn run_writer<S: PreferenceStore>(
    store: Arc<S>,
    shared: Arc<Shared>,
    mut requests: mpsc::UnboundedReceiver<SaveRequest>,
) {
    while let Some(request) = requests.recv().await {
        if let Err(error) = store
            .upsert(request.user_key.as_str(), request.show_details)
            .await
        {
            tracing::error!("Error saving preferences: {}", error);
            shared.record_save_error(request.sequence, error.to_string());
        }
        let _ = request.done.send(());
    }
}

async fn run_countdown(shared: Arc<Shared>, generation: u64, started: Instant) {
    let mut ticks = interval_at(started + TICK_INTERVAL, TICK_INTERVAL);
    loop {
        ticks.tick().await;
        if !shared.tick(generation) {
            break;
        }
    }
}

async fn run_expiry(shared: Arc<Shared>, generation: u64, deadline: Instant) {
    sleep_until(deadline).await;
    shared.expire(generation);
}

#[cfg(test)]
mod tests;
