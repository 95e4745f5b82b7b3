//! Timer state structure and the countdown state machine

use serde::{Deserialize, Serialize};

/// Largest representable duration: 99 minutes 59 seconds
pub const MAX_DURATION_SECONDS: u32 = 99 * 60 + 59;

/// Run state of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Not counting and not just completed
    Idle,
    /// Clock active
    Running,
    /// Reached zero naturally; alert pending until acknowledged
    Finished,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Finished => "finished",
        }
    }
}

/// Result of delivering one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running; nothing changed
    Ignored,
    /// Still counting down with this many seconds left
    Counting(u32),
    /// Reached zero on this tick
    Finished { play_sound: bool },
    /// Clock fired with nothing left to count; timer parked in Idle
    Halted,
}

impl TickOutcome {
    /// Whether the clock that delivered this tick should keep firing
    pub fn keeps_clock(&self) -> bool {
        matches!(self, TickOutcome::Counting(_))
    }
}

/// Timer state: remaining duration, run state and the sound preference
#[derive(Debug, Clone)]
pub struct TimerState {
    duration_seconds: u32,
    run_state: RunState,
    sound_enabled: bool,
}

impl TimerState {
    /// Create an idle timer at 00:00
    pub fn new(sound_enabled: bool) -> Self {
        Self {
            duration_seconds: 0,
            run_state: RunState::Idle,
            sound_enabled,
        }
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Whether the "time's up" alert is waiting to be acknowledged
    pub fn alert_pending(&self) -> bool {
        self.run_state == RunState::Finished
    }

    /// Enter Running. Returns true only when the state actually changed.
    pub fn start(&mut self) -> bool {
        if self.duration_seconds == 0 || self.is_running() {
            return false;
        }
        self.run_state = RunState::Running;
        true
    }

    /// Leave Running, keeping the remaining duration
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.run_state = RunState::Idle;
        true
    }

    pub fn reset(&mut self) {
        self.run_state = RunState::Idle;
        self.duration_seconds = 0;
    }

    /// Replace the minutes part, keeping the seconds part
    pub fn set_minutes(&mut self, minutes: u32) {
        let seconds_part = u64::from(self.duration_seconds % 60);
        self.duration_seconds = clamp_duration(u64::from(minutes) * 60 + seconds_part);
    }

    /// Replace the seconds part, keeping the minutes part
    pub fn set_seconds(&mut self, seconds: u32) {
        let minutes_part = u64::from(self.duration_seconds / 60);
        self.duration_seconds = clamp_duration(minutes_part * 60 + u64::from(seconds));
    }

    /// Advance the countdown by one elapsed second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Ignored;
        }

        match self.duration_seconds {
            0 => {
                self.run_state = RunState::Idle;
                TickOutcome::Halted
            }
            1 => {
                self.duration_seconds = 0;
                self.run_state = RunState::Finished;
                TickOutcome::Finished {
                    play_sound: self.sound_enabled,
                }
            }
            remaining => {
                self.duration_seconds = remaining - 1;
                TickOutcome::Counting(self.duration_seconds)
            }
        }
    }

    /// Dismiss the finished alert. Returns true if an alert was pending.
    pub fn acknowledge_finished(&mut self) -> bool {
        if !self.alert_pending() {
            return false;
        }
        self.run_state = RunState::Idle;
        true
    }

    /// Flip the sound preference and return the new value
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            remaining_seconds: self.duration_seconds,
            display: format_duration(self.duration_seconds),
            run_state: self.run_state,
            sound_enabled: self.sound_enabled,
            alert: self.alert_pending(),
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Read model published after every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub remaining_seconds: u32,
    pub display: String,
    pub run_state: RunState,
    pub sound_enabled: bool,
    pub alert: bool,
}

fn clamp_duration(seconds: u64) -> u32 {
    seconds.min(u64::from(MAX_DURATION_SECONDS)) as u32
}

/// Render seconds as `MM:SS`
pub fn format_duration(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Lenient numeric parse for minute/second edits.
///
/// Reads an optional sign and the leading run of digits, ignoring trailing
/// garbage. Anything without leading digits, and any negative value, is 0.
/// Values too large for `u32` saturate.
pub fn parse_component(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: u32 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(u32::from(byte - b'0'));
    }

    if negative || !seen_digit {
        0
    } else {
        value
    }
}
