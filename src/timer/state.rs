// TimerState - observable countdown snapshot
//
// This module holds the single entity the presentation layer renders: the
// clamped hours/minutes/seconds fields, the running flag, the remaining
// progress fraction, and the formatted display string. All mutation happens
// through the engine; the snapshot itself only knows how to adjust its own
// fields and how to reinterpret a remaining-milliseconds value.

use serde::{Deserialize, Serialize};

use crate::timer::format;

/// Upper bound of the hours field
pub const MAX_HOURS: u32 = 23;

/// Upper bound of the minutes field
pub const MAX_MINUTES: u32 = 59;

/// Upper bound of the seconds field
pub const MAX_SECONDS: u32 = 59;

/// One adjustable countdown field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Hours,
    Minutes,
    Seconds,
}

/// Direction of a single-step field adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOperator {
    Increase,
    Decrease,
}

/// Snapshot of the countdown published to subscribers
///
/// `display_text` is always the zero-padded `HH:MM:SS` rendering of the
/// current fields; every mutating method keeps it in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    /// Hours field, clamped to 0-23
    pub hours: u32,
    /// Minutes field, clamped to 0-59
    pub minutes: u32,
    /// Seconds field, clamped to 0-59
    pub seconds: u32,
    /// Whether a countdown is currently armed
    pub is_running: bool,
    /// Fraction of the total duration remaining (1.0 = full, 0.0 = elapsed)
    pub progress: f32,
    /// Zero-padded `HH:MM:SS` rendering of the fields
    pub display_text: String,
    /// Configured duration captured by the most recent start, in milliseconds
    pub total_duration_millis: u64,
}

impl TimerState {
    /// Create the initial idle state: all-zero fields, full progress ring,
    /// `00:00:00` display.
    pub fn new_idle() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            is_running: false,
            progress: 1.0,
            display_text: format::format_hms(0, 0, 0),
            total_duration_millis: 0,
        }
    }

    /// Step one field up or down, clamped to its range.
    ///
    /// No carry or borrow happens between fields: decrementing seconds at 0
    /// leaves 0, it does not take a minute. The display is refreshed when
    /// the value moved.
    ///
    /// # Returns
    /// `true` if the field value actually changed
    pub fn adjust(&mut self, unit: TimeUnit, op: TimeOperator) -> bool {
        let (field, max) = match unit {
            TimeUnit::Hours => (&mut self.hours, MAX_HOURS),
            TimeUnit::Minutes => (&mut self.minutes, MAX_MINUTES),
            TimeUnit::Seconds => (&mut self.seconds, MAX_SECONDS),
        };

        let previous = *field;
        *field = match op {
            TimeOperator::Increase => previous.saturating_add(1).min(max),
            TimeOperator::Decrease => previous.saturating_sub(1),
        };

        let changed = *field != previous;
        if changed {
            self.refresh_display();
        }
        changed
    }

    /// Reinterpret the fields, progress, and display from a tick's
    /// remaining-milliseconds value.
    ///
    /// Progress is left untouched when no total is configured, which keeps
    /// the ratio well-defined.
    pub fn apply_remaining(&mut self, remaining_millis: u64) {
        self.hours = format::hours_component(remaining_millis);
        self.minutes = format::minutes_component(remaining_millis);
        self.seconds = format::seconds_component(remaining_millis);
        if self.total_duration_millis > 0 {
            self.progress = remaining_millis as f32 / self.total_duration_millis as f32;
        }
        self.refresh_display();
    }

    /// Total duration the current field values describe, in milliseconds.
    pub fn configured_duration_millis(&self) -> u64 {
        format::total_duration_millis(self.hours, self.minutes, self.seconds)
    }

    fn refresh_display(&mut self) {
        self.display_text = format::format_hms(self.hours, self.minutes, self.seconds);
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = TimerState::new_idle();
        assert_eq!(state.hours, 0);
        assert_eq!(state.minutes, 0);
        assert_eq!(state.seconds, 0);
        assert!(!state.is_running);
        assert_eq!(state.progress, 1.0);
        assert_eq!(state.display_text, "00:00:00");
        assert_eq!(state.total_duration_millis, 0);
    }

    #[test]
    fn test_adjust_steps_and_reports_change() {
        let mut state = TimerState::new_idle();
        assert!(state.adjust(TimeUnit::Seconds, TimeOperator::Increase));
        assert_eq!(state.seconds, 1);
        assert_eq!(state.display_text, "00:00:01");

        assert!(state.adjust(TimeUnit::Minutes, TimeOperator::Increase));
        assert!(state.adjust(TimeUnit::Hours, TimeOperator::Increase));
        assert_eq!(state.display_text, "01:01:01");
    }

    #[test]
    fn test_adjust_clamps_at_lower_bound() {
        let mut state = TimerState::new_idle();
        assert!(!state.adjust(TimeUnit::Seconds, TimeOperator::Decrease));
        assert_eq!(state.seconds, 0);

        // No borrow from the neighbouring field.
        state.adjust(TimeUnit::Minutes, TimeOperator::Increase);
        assert!(!state.adjust(TimeUnit::Seconds, TimeOperator::Decrease));
        assert_eq!(state.minutes, 1);
        assert_eq!(state.seconds, 0);
    }

    #[test]
    fn test_adjust_clamps_at_upper_bound() {
        let mut state = TimerState::new_idle();
        for _ in 0..MAX_SECONDS {
            state.adjust(TimeUnit::Seconds, TimeOperator::Increase);
        }
        assert_eq!(state.seconds, MAX_SECONDS);
        assert!(!state.adjust(TimeUnit::Seconds, TimeOperator::Increase));
        assert_eq!(state.seconds, MAX_SECONDS);
        assert_eq!(state.minutes, 0);

        for _ in 0..=MAX_HOURS {
            state.adjust(TimeUnit::Hours, TimeOperator::Increase);
        }
        assert_eq!(state.hours, MAX_HOURS);
    }

    #[test]
    fn test_adjust_does_not_touch_progress_or_running() {
        let mut state = TimerState::new_idle();
        state.adjust(TimeUnit::Seconds, TimeOperator::Increase);
        assert_eq!(state.progress, 1.0);
        assert!(!state.is_running);
        assert_eq!(state.total_duration_millis, 0);
    }

    #[test]
    fn test_apply_remaining_recomputes_fields_and_progress() {
        let mut state = TimerState::new_idle();
        state.adjust(TimeUnit::Seconds, TimeOperator::Increase);
        state.adjust(TimeUnit::Seconds, TimeOperator::Increase);
        state.adjust(TimeUnit::Seconds, TimeOperator::Increase);
        state.total_duration_millis = state.configured_duration_millis();

        state.apply_remaining(2_000);
        assert_eq!(state.seconds, 2);
        assert_eq!(state.display_text, "00:00:02");
        assert!((state.progress - 2.0 / 3.0).abs() < 1e-6);

        state.apply_remaining(0);
        assert_eq!(state.seconds, 0);
        assert_eq!(state.display_text, "00:00:00");
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn test_apply_remaining_without_total_keeps_progress() {
        let mut state = TimerState::new_idle();
        state.apply_remaining(5_000);
        assert_eq!(state.seconds, 5);
        assert_eq!(state.progress, 1.0);
    }

    #[test]
    fn test_configured_duration() {
        let mut state = TimerState::new_idle();
        state.adjust(TimeUnit::Minutes, TimeOperator::Increase);
        assert_eq!(state.configured_duration_millis(), 60_000);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut state = TimerState::new_idle();
        state.adjust(TimeUnit::Hours, TimeOperator::Increase);
        let json = serde_json::to_string(&state).unwrap();
        let parsed: TimerState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
