//! One-second countdown clock

use std::{sync::Weak, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

use crate::state::AppState;

/// Period between two ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owned handle to a running clock.
///
/// The clock task stops when the handle is cancelled or dropped; the owner
/// never has to rely on the task noticing on its own.
#[derive(Debug)]
pub struct ClockHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl ClockHandle {
    /// Spawn a clock that delivers ticks tagged with `generation`.
    ///
    /// The task only holds a weak reference, so dropping the state ends it.
    pub fn spawn(state: Weak<AppState>, generation: u64) -> Self {
        let task = tokio::spawn(run_clock(state, generation));
        debug!("Countdown clock #{} started", generation);
        Self { generation, task }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the clock. Consumes the handle so it cannot be cancelled twice.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Countdown clock #{} cancelled", self.generation);
    }
}

async fn run_clock(state: Weak<AppState>, generation: u64) {
    // First tick one full period after entering Running
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        interval.tick().await;

        let Some(owner) = state.upgrade() else {
            debug!("Timer state dropped, clock #{} exiting", generation);
            break;
        };

        if !owner.tick(generation) {
            break;
        }
    }
}
