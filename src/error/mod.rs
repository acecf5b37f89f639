// Error types for the countdown timer core
//
// This module defines the custom error type for timer operations, providing
// structured error handling with numeric codes suitable for host-facing
// reporting.

mod timer;

pub use timer::{log_timer_error, TimerError, TimerErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the embedding boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
