//! External collaborator module
//!
//! This module contains the preference store and the notification sound
//! player the timer talks to.

pub mod preferences;
pub mod sound;

// Re-export main types
pub use preferences::*;
pub use sound::*;
