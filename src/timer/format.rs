//! Time arithmetic and display formatting for the countdown engine.
//!
//! Pure functions (no side effects, deterministic output) shared by the
//! engine tick path and the state snapshot type. All remaining-time math
//! works on milliseconds and truncates toward zero, so a countdown that is
//! anywhere inside its final second already displays `00:00:00`.

/// Milliseconds in one second
pub const MILLIS_PER_SECOND: u64 = 1000;

/// Seconds in one minute
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Minutes in one hour
pub const MINUTES_PER_HOUR: u64 = 60;

/// Computes the total countdown duration in milliseconds from field values.
///
/// # Arguments
/// * `hours` - Hours field (0-23 once clamped by the state type)
/// * `minutes` - Minutes field (0-59)
/// * `seconds` - Seconds field (0-59)
///
/// # Returns
/// Total duration in milliseconds: `((hours*60 + minutes)*60 + seconds) * 1000`
pub fn total_duration_millis(hours: u32, minutes: u32, seconds: u32) -> u64 {
    ((hours as u64 * MINUTES_PER_HOUR + minutes as u64) * SECONDS_PER_MINUTE + seconds as u64)
        * MILLIS_PER_SECOND
}

/// Extracts the seconds field from a remaining-milliseconds value.
///
/// # Arguments
/// * `remaining_millis` - Milliseconds left on the countdown
///
/// # Returns
/// `(remaining / 1000) % 60`, the seconds digit pair of the display
pub fn seconds_component(remaining_millis: u64) -> u32 {
    (remaining_millis / MILLIS_PER_SECOND % SECONDS_PER_MINUTE) as u32
}

/// Extracts the minutes field from a remaining-milliseconds value.
///
/// # Arguments
/// * `remaining_millis` - Milliseconds left on the countdown
///
/// # Returns
/// `(remaining / 1000 / 60) % 60`, the minutes digit pair of the display
pub fn minutes_component(remaining_millis: u64) -> u32 {
    (remaining_millis / MILLIS_PER_SECOND / SECONDS_PER_MINUTE % MINUTES_PER_HOUR) as u32
}

/// Extracts the hours field from a remaining-milliseconds value.
///
/// Not wrapped at 24: the field bounds guarantee remaining time never
/// exceeds 23:59:59, so the quotient is already in range.
///
/// # Arguments
/// * `remaining_millis` - Milliseconds left on the countdown
///
/// # Returns
/// `remaining / 1000 / 3600`, the hours digit pair of the display
pub fn hours_component(remaining_millis: u64) -> u32 {
    (remaining_millis / MILLIS_PER_SECOND / SECONDS_PER_MINUTE / MINUTES_PER_HOUR) as u32
}

/// Renders field values as a zero-padded `HH:MM:SS` string.
///
/// # Examples
/// ```
/// use countdown_timer::timer::format::format_hms;
///
/// assert_eq!(format_hms(0, 0, 0), "00:00:00");
/// assert_eq!(format_hms(1, 2, 3), "01:02:03");
/// ```
pub fn format_hms(hours: u32, minutes: u32, seconds: u32) -> String {
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_duration_formula() {
        assert_eq!(total_duration_millis(0, 0, 0), 0);
        assert_eq!(total_duration_millis(0, 0, 3), 3_000);
        assert_eq!(total_duration_millis(0, 1, 0), 60_000);
        assert_eq!(total_duration_millis(1, 1, 1), 3_661_000);
        // Maximum configurable duration: 23:59:59
        assert_eq!(total_duration_millis(23, 59, 59), 86_399_000);
    }

    #[test]
    fn test_components_decompose_remaining_millis() {
        let remaining = total_duration_millis(1, 1, 1);
        assert_eq!(hours_component(remaining), 1);
        assert_eq!(minutes_component(remaining), 1);
        assert_eq!(seconds_component(remaining), 1);

        assert_eq!(seconds_component(2_000), 2);
        assert_eq!(minutes_component(2_000), 0);
        assert_eq!(hours_component(2_000), 0);
    }

    #[test]
    fn test_components_truncate_partial_seconds() {
        // Anything below one full second reads as zero on every field.
        assert_eq!(seconds_component(999), 0);
        assert_eq!(seconds_component(1_999), 1);
        assert_eq!(minutes_component(59_999), 0);
        assert_eq!(minutes_component(60_000), 1);
    }

    #[test]
    fn test_components_round_trip_total() {
        // Decomposing a freshly configured total reproduces the fields.
        for (h, m, s) in [(0, 0, 3), (0, 59, 59), (23, 0, 1), (12, 34, 56)] {
            let total = total_duration_millis(h, m, s);
            assert_eq!(hours_component(total), h);
            assert_eq!(minutes_component(total), m);
            assert_eq!(seconds_component(total), s);
        }
    }

    #[test]
    fn test_format_hms_zero_pads() {
        assert_eq!(format_hms(0, 0, 0), "00:00:00");
        assert_eq!(format_hms(9, 5, 7), "09:05:07");
        assert_eq!(format_hms(23, 59, 59), "23:59:59");
    }
}
