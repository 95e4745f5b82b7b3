//! State management module
//!
//! This module contains the countdown state machine and the application
//! state that owns it together with its clock and collaborators.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{
    format_duration, parse_component, RunState, TickOutcome, TimerSnapshot, TimerState,
    MAX_DURATION_SECONDS,
};
