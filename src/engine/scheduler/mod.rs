//! Scheduler abstractions for the countdown engine core.

use std::sync::Arc;
use std::time::Instant;

use crate::error::TimerError;

/// Callbacks a schedule registration drives.
///
/// `on_tick` fires once per interval with the milliseconds still remaining;
/// `on_finish` fires exactly once when the countdown reaches zero, after
/// which the registration is spent and delivers nothing further.
pub trait TickSink: Send + Sync {
    fn on_tick(&self, remaining_millis: u64);
    fn on_finish(&self);
}

/// Owned side of one armed schedule registration.
///
/// `cancel` synchronously invalidates the registration: no callback started
/// after it returns may be delivered. Dropping the handle cancels too.
pub trait ScheduleHandle: Send {
    fn cancel(&mut self);
}

/// Trait implemented by periodic countdown schedulers.
///
/// Each scheduler arms a countdown of `total_millis` that steps down by
/// `interval_millis` per tick, calling into the provided [TickSink] without
/// holding scheduler-internal locks.
pub trait TickScheduler: Send + Sync {
    fn schedule(
        &self,
        total_millis: u64,
        interval_millis: u64,
        sink: Arc<dyn TickSink>,
    ) -> Result<Box<dyn ScheduleHandle>, TimerError>;
}

/// Trait representing a monotonic time source used for event timestamps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default time source backed by `Instant::now`.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

mod manual;
pub use manual::{ManualTickScheduler, StubTimeSource};

mod tokio;
pub use self::tokio::TokioTickScheduler;
