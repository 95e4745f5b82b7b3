//! Simple Timer - a single countdown timer with sound alerts
//!
//! This library provides the countdown state machine, its one-second clock,
//! the persisted sound preference and a small HTTP control surface.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
