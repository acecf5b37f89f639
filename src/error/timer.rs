// Timer error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Timer error code constants exposed to the embedding host
///
/// These constants provide a single source of truth for error codes shared
/// between the engine and any host-side error mapping.
///
/// Error code range: 1001-1002
pub struct TimerErrorCodes {}

impl TimerErrorCodes {
    /// Tick interval is invalid (must be > 0 milliseconds)
    pub const INTERVAL_INVALID: i32 = 1001;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 1002;
}

/// Log a timer error with structured context
///
/// Logs the numeric code, the component, and the human-readable message so
/// host-side logs can be correlated with engine state. Non-blocking and
/// panic-free.
pub fn log_timer_error(err: &TimerError, context: &str) {
    error!(
        "Timer error in {}: code={}, component=CountdownEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Timer-related errors
///
/// The countdown contract treats out-of-range adjustments, zero-duration
/// starts, and redundant cancels as silent no-ops, so the surfaced error
/// space is small: a misconfigured tick interval and lock poisoning.
///
/// Error code range: 1001-1002
#[derive(Debug, Clone, PartialEq)]
pub enum TimerError {
    /// Tick interval is invalid (must be > 0 milliseconds)
    IntervalInvalid { interval_ms: u64 },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for TimerError {
    fn code(&self) -> i32 {
        match self {
            TimerError::IntervalInvalid { .. } => TimerErrorCodes::INTERVAL_INVALID,
            TimerError::LockPoisoned { .. } => TimerErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            TimerError::IntervalInvalid { interval_ms } => {
                format!(
                    "Tick interval must be greater than 0 ms (got {})",
                    interval_ms
                )
            }
            TimerError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimerError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for TimerError {}
