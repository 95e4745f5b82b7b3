//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::timer_state::{RunState, TickOutcome, TimerSnapshot, TimerState};
use crate::{
    services::{PreferenceStore, SoundPlayer},
    tasks::ClockHandle,
};

/// Timer plus the clock currently driving it. Guarded by one lock so a
/// transition and the clock's lifetime always change together.
#[derive(Debug)]
struct Shared {
    timer: TimerState,
    clock: Option<ClockHandle>,
    next_generation: u64,
}

/// Owner of the single countdown timer and its collaborators
pub struct AppState {
    shared: Mutex<Shared>,
    preferences: Box<dyn PreferenceStore>,
    sound: Arc<dyn SoundPlayer>,
    /// Server metadata
    pub start_time: Instant,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Channel for timer updates
    timer_update_tx: watch::Sender<TimerSnapshot>,
}

impl AppState {
    /// Create the state, reading the sound preference once
    pub fn new(preferences: Box<dyn PreferenceStore>, sound: Arc<dyn SoundPlayer>) -> Self {
        let sound_enabled = preferences.load();
        info!("Loaded sound preference: {}", sound_enabled);

        let timer = TimerState::new(sound_enabled);
        let (timer_update_tx, _) = watch::channel(timer.snapshot());

        Self {
            shared: Mutex::new(Shared {
                timer,
                clock: None,
                next_generation: 0,
            }),
            preferences,
            sound,
            start_time: Instant::now(),
            last_action: Mutex::new(None),
            timer_update_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Timer lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Record the action and publish the snapshot. Taking `&Shared` means
    /// the caller still holds the lock, so publishes are ordered with the
    /// transitions that produced them.
    fn commit(&self, shared: &Shared, action: &str) -> TimerSnapshot {
        let snapshot = shared.timer.snapshot();
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
        self.timer_update_tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Bring the clock in line with the run state: exactly one clock while
    /// running, none otherwise.
    fn sync_clock(self: &Arc<Self>, shared: &mut Shared) {
        match (shared.timer.is_running(), shared.clock.is_some()) {
            (true, false) => {
                shared.next_generation += 1;
                shared.clock = Some(ClockHandle::spawn(
                    Arc::downgrade(self),
                    shared.next_generation,
                ));
            }
            (false, true) => {
                if let Some(clock) = shared.clock.take() {
                    clock.cancel();
                }
            }
            _ => {}
        }
    }

    /// Start counting down; no-op at 00:00 or when already running
    pub fn start(self: &Arc<Self>) -> TimerSnapshot {
        let mut shared = self.lock();
        if shared.timer.start() {
            info!("Timer started at {}", shared.timer.snapshot().display);
        } else {
            debug!(
                "Start ignored: state={}, remaining={}s",
                shared.timer.run_state().as_str(),
                shared.timer.duration_seconds()
            );
        }
        self.sync_clock(&mut shared);
        self.commit(&shared, "start")
    }

    /// Stop counting down, keeping the remaining time
    pub fn pause(self: &Arc<Self>) -> TimerSnapshot {
        let mut shared = self.lock();
        if shared.timer.pause() {
            info!("Timer paused at {}", shared.timer.snapshot().display);
        } else {
            debug!("Pause ignored: timer not running");
        }
        self.sync_clock(&mut shared);
        self.commit(&shared, "pause")
    }

    /// Pause when running, start otherwise
    pub fn toggle(self: &Arc<Self>) -> TimerSnapshot {
        let running = self.lock().timer.is_running();
        if running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(self: &Arc<Self>) -> TimerSnapshot {
        let mut shared = self.lock();
        shared.timer.reset();
        self.sync_clock(&mut shared);
        info!("Timer reset");
        self.commit(&shared, "reset")
    }

    /// Replace the minutes part. A running clock keeps running.
    pub fn set_minutes(&self, minutes: u32) -> TimerSnapshot {
        let mut shared = self.lock();
        shared.timer.set_minutes(minutes);
        debug!("Minutes set to {}", minutes);
        self.commit(&shared, "set-minutes")
    }

    /// Replace the seconds part. A running clock keeps running.
    pub fn set_seconds(&self, seconds: u32) -> TimerSnapshot {
        let mut shared = self.lock();
        shared.timer.set_seconds(seconds);
        debug!("Seconds set to {}", seconds);
        self.commit(&shared, "set-seconds")
    }

    /// Deliver one tick from the clock tagged `generation`.
    ///
    /// Ticks from any clock other than the current one are dropped. Returns
    /// whether that clock should keep firing.
    pub fn tick(&self, generation: u64) -> bool {
        let mut shared = self.lock();
        let current = shared.clock.as_ref().map(ClockHandle::generation);
        if current != Some(generation) {
            debug!("Stale tick from clock #{} ignored", generation);
            return false;
        }

        let outcome = shared.timer.tick();
        if !outcome.keeps_clock() {
            if let Some(clock) = shared.clock.take() {
                clock.cancel();
            }
        }

        match outcome {
            TickOutcome::Counting(remaining) => {
                debug!("Tick: {}s remaining", remaining);
                self.timer_update_tx.send_replace(shared.timer.snapshot());
                true
            }
            TickOutcome::Finished { play_sound } => {
                info!("Time's up!");
                self.commit(&shared, "finished");
                drop(shared);
                if play_sound {
                    self.sound.play();
                }
                false
            }
            TickOutcome::Halted => {
                info!("Clock fired at 00:00, timer stopped");
                self.commit(&shared, "halted");
                false
            }
            TickOutcome::Ignored => false,
        }
    }

    /// Dismiss the finished alert
    pub fn acknowledge_finished(&self) -> TimerSnapshot {
        let mut shared = self.lock();
        if shared.timer.acknowledge_finished() {
            info!("Finished alert acknowledged");
        } else {
            debug!("Acknowledge ignored: no alert pending");
        }
        self.commit(&shared, "acknowledge")
    }

    /// Flip the sound preference and persist it. Saving happens under the
    /// lock so the stored value always matches the last published one.
    pub fn toggle_sound(&self) -> TimerSnapshot {
        let mut shared = self.lock();
        let enabled = shared.timer.toggle_sound();
        info!("Sound {}", if enabled { "enabled" } else { "disabled" });
        self.preferences.save(enabled);
        self.commit(&shared, "toggle-sound")
    }

    /// Tear down: pause the timer and stop its clock
    pub fn shutdown(&self) {
        let mut shared = self.lock();
        if shared.timer.pause() {
            info!("Timer paused for shutdown at {}", shared.timer.snapshot().display);
        }
        if let Some(clock) = shared.clock.take() {
            info!("Stopping countdown clock for shutdown");
            clock.cancel();
        }
        self.commit(&shared, "shutdown");
    }

    /// Get current timer snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().timer.snapshot()
    }

    pub fn run_state(&self) -> RunState {
        self.lock().timer.run_state()
    }

    /// Whether a countdown clock is currently alive
    pub fn clock_active(&self) -> bool {
        self.lock().clock.is_some()
    }

    /// Generation of the current clock, if any
    pub fn clock_generation(&self) -> Option<u64> {
        self.lock().clock.as_ref().map(ClockHandle::generation)
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("timer", &self.snapshot())
            .field("clock_active", &self.clock_active())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{CountingPlayer, MemoryPreferenceStore};
    use std::{sync::mpsc, thread, time::Duration};

    fn state_with(store: MemoryPreferenceStore) -> (Arc<AppState>, Arc<CountingPlayer>) {
        let player = Arc::new(CountingPlayer::new());
        let state = Arc::new(AppState::new(Box::new(store), player.clone()));
        (state, player)
    }

    #[tokio::test]
    async fn sound_preference_is_loaded_once_at_startup() {
        let (state, _) = state_with(MemoryPreferenceStore::with_value(false));
        assert!(!state.snapshot().sound_enabled);
    }

    #[tokio::test]
    async fn start_spawns_exactly_one_clock() {
        let (state, _) = state_with(MemoryPreferenceStore::new());
        state.set_seconds(10);
        state.start();
        let first = state.clock_generation();
        state.start();
        assert!(first.is_some());
        assert_eq!(state.clock_generation(), first);
    }

    #[tokio::test]
    async fn start_at_zero_spawns_no_clock() {
        let (state, _) = state_with(MemoryPreferenceStore::new());
        state.start();
        assert!(!state.clock_active());
        assert_eq!(state.run_state(), RunState::Idle);
    }

    #[tokio::test]
    async fn ticks_from_cancelled_clock_are_ignored() {
        let (state, _) = state_with(MemoryPreferenceStore::new());
        state.set_seconds(30);
        state.start();
        let old = state.clock_generation().unwrap();
        state.pause();
        assert!(!state.clock_active());

        assert!(!state.tick(old));
        assert_eq!(state.snapshot().remaining_seconds, 30);

        state.start();
        let new = state.clock_generation().unwrap();
        assert_ne!(old, new);
        assert!(!state.tick(old));
        assert!(state.tick(new));
        assert_eq!(state.snapshot().remaining_seconds, 29);
    }

    #[tokio::test]
    async fn final_tick_plays_sound_and_drops_clock() {
        let (state, player) = state_with(MemoryPreferenceStore::new());
        state.set_seconds(1);
        state.start();
        let generation = state.clock_generation().unwrap();

        assert!(!state.tick(generation));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.run_state, RunState::Finished);
        assert!(snapshot.alert);
        assert!(!state.clock_active());
        assert_eq!(player.plays(), 1);
    }

    #[tokio::test]
    async fn final_tick_is_silent_with_sound_off() {
        let (state, player) = state_with(MemoryPreferenceStore::with_value(false));
        state.set_seconds(1);
        state.start();
        let generation = state.clock_generation().unwrap();
        state.tick(generation);
        assert_eq!(state.run_state(), RunState::Finished);
        assert_eq!(player.plays(), 0);
    }

    #[tokio::test]
    async fn toggle_sound_persists() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let player = Arc::new(CountingPlayer::new());
        let state = AppState::new(Box::new(store.clone()), player);

        assert!(!state.toggle_sound().sound_enabled);
        assert_eq!(store.stored(), Some(false));
        assert!(state.toggle_sound().sound_enabled);
        assert_eq!(store.stored(), Some(true));
    }

    #[tokio::test]
    async fn reset_and_shutdown_cancel_clock() {
        let (state, _) = state_with(MemoryPreferenceStore::new());
        state.set_minutes(1);
        state.start();
        state.reset();
        assert!(!state.clock_active());
        assert_eq!(state.snapshot().remaining_seconds, 0);

        state.set_minutes(1);
        state.start();
        state.shutdown();
        assert!(!state.clock_active());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.remaining_seconds, 60);
        assert_eq!(snapshot.run_state, RunState::Idle);
        assert_eq!(state.subscribe().borrow().run_state, RunState::Idle);

        // A paused timer can be started again, which needs a fresh clock
        assert_eq!(state.start().run_state, RunState::Running);
        assert!(state.clock_active());
    }

    /// Store whose first save blocks until released
    struct GatedStore {
        inner: MemoryPreferenceStore,
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl PreferenceStore for GatedStore {
        fn load(&self) -> bool {
            self.inner.load()
        }

        fn save(&self, sound_enabled: bool) {
            let gate = self.release.lock().unwrap().take();
            if let Some(release) = gate {
                self.entered.lock().unwrap().send(()).unwrap();
                release.recv().unwrap();
            }
            self.inner.save(sound_enabled);
        }
    }

    #[test]
    fn concurrent_sound_toggles_persist_the_published_value() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Arc::new(GatedStore {
            inner: MemoryPreferenceStore::new(),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(Some(release_rx)),
        });
        let state = AppState::new(Box::new(store.clone()), Arc::new(CountingPlayer::new()));

        thread::scope(|scope| {
            let first = scope.spawn(|| state.toggle_sound());
            entered_rx.recv().unwrap();
            let second = scope.spawn(|| state.toggle_sound());
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();
            first.join().unwrap();
            second.join().unwrap();
        });

        let in_memory = state.snapshot().sound_enabled;
        assert!(in_memory);
        assert_eq!(store.inner.stored(), Some(in_memory));
        assert_eq!(state.subscribe().borrow().sound_enabled, in_memory);
    }

    #[tokio::test]
    async fn toggle_switches_between_start_and_pause() {
        let (state, _) = state_with(MemoryPreferenceStore::new());
        state.set_seconds(5);
        assert_eq!(state.toggle().run_state, RunState::Running);
        assert_eq!(state.toggle().run_state, RunState::Idle);
        assert_eq!(state.get_last_action().0.as_deref(), Some("pause"));
    }

    #[tokio::test]
    async fn subscribers_see_committed_snapshots() {
        let (state, _) = state_with(MemoryPreferenceStore::new());
        let mut rx = state.subscribe();
        state.set_minutes(2);
        state.set_seconds(5);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().display, "02:05");
    }
}
