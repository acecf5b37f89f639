// Public API surface for host integrations
// This module provides the functions a UI shell calls to drive the countdown timer

use anyhow::Result;
use futures::Stream;
use once_cell::sync::Lazy;
use tokio_stream::wrappers::{UnboundedReceiverStream, WatchStream};

use crate::engine::{CountdownEngine, TimerEvent};
use crate::error::TimerError;
use crate::timer::{TimeOperator, TimeUnit, TimerState};

// Re-export error code constants for host exposure
pub use crate::error::TimerErrorCodes;

/// Global CountdownEngine instance shared by every public entry point.
///
/// Hosts treat the engine as a singleton: one timer screen, one engine.
/// Tests that need isolation construct their own engine via
/// `CountdownEngine::from_parts` instead of going through these functions.
static ENGINE: Lazy<CountdownEngine> = Lazy::new(CountdownEngine::new);

/// Get the version of the countdown engine
///
/// # Returns
///
/// * `Result<String>` - Version string
pub fn engine_version() -> Result<String> {
    Ok(env!("CARGO_PKG_VERSION").to_string())
}

/// Step one duration field up or down
///
/// Adjustments clamp at the field bounds (hours 0-23, minutes and seconds
/// 0-59) and never borrow from neighbouring fields. While a countdown is
/// running the call is accepted and ignored.
///
/// # Arguments
/// * `unit` - Which field to adjust (hours, minutes, seconds)
/// * `operator` - Direction of the step
///
/// # Returns
/// * `Ok(())` - Adjustment applied, clamped, or ignored
/// * `Err(TimerError)` - Lock poisoning on shared state
pub fn adjust_time(unit: TimeUnit, operator: TimeOperator) -> Result<(), TimerError> {
    ENGINE.adjust_field(unit, operator)
}

/// Start the countdown from the currently configured duration
///
/// Starting while a countdown is already running re-arms it atomically from
/// the current field values. Starting with all fields at zero is a no-op.
///
/// # Returns
/// * `Ok(())` - Countdown armed (or no-op on zero duration)
/// * `Err(TimerError)` - Invalid tick interval or lock poisoning
pub fn start_timer() -> Result<(), TimerError> {
    ENGINE.start()
}

/// Cancel the active countdown, freezing the fields where they stand
///
/// Safe to call when no countdown is running.
///
/// # Returns
/// * `Ok(())` - Countdown cancelled or nothing to cancel
/// * `Err(TimerError)` - Lock poisoning on shared state
pub fn cancel_timer() -> Result<(), TimerError> {
    ENGINE.cancel()
}

/// Release the engine's scheduling resources
///
/// Hosts call this when the timer screen goes away. Equivalent to cancel.
///
/// # Returns
/// * `Ok(())` - Resources released
/// * `Err(TimerError)` - Lock poisoning on shared state
pub fn dispose_timer() -> Result<(), TimerError> {
    ENGINE.dispose()
}

/// Get a clone of the current timer state
pub fn timer_snapshot() -> TimerState {
    ENGINE.snapshot()
}

/// Stream of timer state snapshots
///
/// Yields the current state immediately on subscription, then one snapshot
/// per observable change: field adjustments, start, each applied tick,
/// completion, and cancellation. Slow consumers only ever skip intermediate
/// snapshots, never see stale ones.
pub fn timer_state_stream() -> impl Stream<Item = TimerState> + Unpin {
    WatchStream::new(ENGINE.subscribe_state())
}

/// Stream of timer lifecycle events
///
/// Yields a `TimerEvent` for each start, natural completion, and
/// cancellation, stamped with milliseconds since engine creation.
pub fn timer_event_stream() -> impl Stream<Item = TimerEvent> + Unpin {
    UnboundedReceiverStream::new(ENGINE.subscribe_events())
}

// Error code constant accessors for host platforms
// These expose the stable numeric codes carried by TimerError

/// Get TimerErrorCodes as a structured object with all error code constants
pub fn get_timer_error_codes() -> TimerErrorCodes {
    TimerErrorCodes {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version().unwrap();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_timer_snapshot_starts_idle() {
        // Read-only: other tests build their own engines, so the global
        // stays untouched.
        let state = timer_snapshot();
        assert!(!state.is_running);
        assert_eq!(state.display_text, "00:00:00");
    }

    #[test]
    fn test_get_timer_error_codes() {
        let codes = get_timer_error_codes();
        assert_eq!(TimerErrorCodes::INTERVAL_INVALID, 1001);
        let _ = codes;
    }
}
