//! Countdown state snapshot and time formatting.

pub mod format;
pub mod state;

pub use state::{TimeOperator, TimeUnit, TimerState, MAX_HOURS, MAX_MINUTES, MAX_SECONDS};
