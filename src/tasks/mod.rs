//! Background tasks module
//!
//! This module contains the countdown clock and the terminal display that
//! run alongside the HTTP control surface.

pub mod countdown_clock;
pub mod display;

// Re-export main items
pub use countdown_clock::{ClockHandle, TICK_PERIOD};
pub use display::display_task;
