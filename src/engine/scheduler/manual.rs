//! Deterministic scheduler for tests and the simulate CLI.
//!
//! Registrations advance only when the driver calls [`ManualTickScheduler::fire_tick`],
//! so countdown behavior can be verified against an exactly known number of
//! elapsed intervals. Counters expose how many registrations were ever armed,
//! how many are still live, and how many callbacks were delivered.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::TimerError;

use super::{ScheduleHandle, TickScheduler, TickSink, TimeSource};

struct ManualRegistration {
    remaining_millis: u64,
    interval_millis: u64,
    sink: Arc<dyn TickSink>,
    cancelled: Arc<AtomicBool>,
    finished: bool,
}

impl ManualRegistration {
    fn live(&self) -> bool {
        !self.finished && !self.cancelled.load(Ordering::SeqCst)
    }
}

enum Delivery {
    Tick(Arc<dyn TickSink>, u64),
    Finish(Arc<dyn TickSink>),
}

/// Scheduler whose clock is the driver calling [`fire_tick`](Self::fire_tick).
pub struct ManualTickScheduler {
    registrations: Mutex<Vec<ManualRegistration>>,
    scheduled: AtomicU64,
    delivered: AtomicU64,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            scheduled: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
        }
    }

    /// Advance every live registration by one of its own intervals.
    ///
    /// Callbacks are collected under the registry lock but delivered after
    /// it is released, so a sink may re-enter the scheduler (a finish
    /// handler arming a new countdown, for example).
    ///
    /// # Returns
    /// Number of callbacks delivered for this step
    pub fn fire_tick(&self) -> usize {
        let mut due: Vec<Delivery> = Vec::new();
        {
            let mut registrations = self.lock_registry();
            for registration in registrations.iter_mut() {
                if !registration.live() {
                    continue;
                }
                registration.remaining_millis = registration
                    .remaining_millis
                    .saturating_sub(registration.interval_millis);
                if registration.remaining_millis == 0 {
                    registration.finished = true;
                    due.push(Delivery::Finish(Arc::clone(&registration.sink)));
                } else {
                    due.push(Delivery::Tick(
                        Arc::clone(&registration.sink),
                        registration.remaining_millis,
                    ));
                }
            }
            registrations.retain(ManualRegistration::live);
        }

        let count = due.len();
        self.delivered.fetch_add(count as u64, Ordering::SeqCst);
        for delivery in due {
            match delivery {
                Delivery::Tick(sink, remaining) => sink.on_tick(remaining),
                Delivery::Finish(sink) => sink.on_finish(),
            }
        }
        count
    }

    /// Fire `ticks` consecutive steps.
    ///
    /// # Returns
    /// Total callbacks delivered across the steps
    pub fn advance(&self, ticks: u32) -> usize {
        (0..ticks).map(|_| self.fire_tick()).sum()
    }

    /// Registrations still armed (neither cancelled nor finished).
    pub fn live_registrations(&self) -> usize {
        self.lock_registry().iter().filter(|r| r.live()).count()
    }

    /// Registrations ever armed through this scheduler.
    pub fn total_scheduled(&self) -> u64 {
        self.scheduled.load(Ordering::SeqCst)
    }

    /// Callbacks (ticks plus finishes) delivered so far.
    pub fn delivered_callbacks(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Vec<ManualRegistration>> {
        self.registrations
            .lock()
            .unwrap_or_else(|err| err.into_inner())
    }
}

impl Default for ManualTickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(
        &self,
        total_millis: u64,
        interval_millis: u64,
        sink: Arc<dyn TickSink>,
    ) -> Result<Box<dyn ScheduleHandle>, TimerError> {
        if interval_millis == 0 {
            return Err(TimerError::IntervalInvalid {
                interval_ms: interval_millis,
            });
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        self.lock_registry().push(ManualRegistration {
            remaining_millis: total_millis,
            interval_millis,
            sink,
            cancelled: Arc::clone(&cancelled),
            finished: false,
        });
        self.scheduled.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ManualScheduleHandle { cancelled }))
    }
}

struct ManualScheduleHandle {
    cancelled: Arc<AtomicBool>,
}

impl ScheduleHandle for ManualScheduleHandle {
    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Drop for ManualScheduleHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Deterministic time source for simulated runs.
///
/// Each call to `now()` advances by a fixed 10ms to guarantee monotonic
/// timestamps without a real clock.
pub struct StubTimeSource {
    start: Instant,
    offset_ms: AtomicU64,
}

impl StubTimeSource {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }
}

impl Default for StubTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StubTimeSource {
    fn now(&self) -> Instant {
        let ms = self.offset_ms.fetch_add(10, Ordering::SeqCst);
        self.start + Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        ticks: Mutex<Vec<u64>>,
        finishes: AtomicU64,
    }

    impl TickSink for RecordingSink {
        fn on_tick(&self, remaining_millis: u64) {
            self.ticks.lock().unwrap().push(remaining_millis);
        }

        fn on_finish(&self) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let scheduler = ManualTickScheduler::new();
        let sink = Arc::new(RecordingSink::default());
        let result = scheduler.schedule(3_000, 0, sink);
        assert_eq!(
            result.err(),
            Some(TimerError::IntervalInvalid { interval_ms: 0 })
        );
        assert_eq!(scheduler.total_scheduled(), 0);
    }

    #[test]
    fn test_fire_tick_counts_down_and_finishes() {
        let scheduler = ManualTickScheduler::new();
        let sink = Arc::new(RecordingSink::default());
        let _handle = scheduler
            .schedule(3_000, 1_000, Arc::clone(&sink) as Arc<dyn TickSink>)
            .unwrap();

        assert_eq!(scheduler.fire_tick(), 1);
        assert_eq!(scheduler.fire_tick(), 1);
        assert_eq!(scheduler.fire_tick(), 1);
        // Registration spent: further steps deliver nothing.
        assert_eq!(scheduler.fire_tick(), 0);

        assert_eq!(*sink.ticks.lock().unwrap(), vec![2_000, 1_000]);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.delivered_callbacks(), 3);
        assert_eq!(scheduler.live_registrations(), 0);
    }

    #[test]
    fn test_cancelled_registration_is_skipped() {
        let scheduler = ManualTickScheduler::new();
        let sink = Arc::new(RecordingSink::default());
        let mut handle = scheduler
            .schedule(3_000, 1_000, Arc::clone(&sink) as Arc<dyn TickSink>)
            .unwrap();

        handle.cancel();
        assert_eq!(scheduler.fire_tick(), 0);
        assert!(sink.ticks.lock().unwrap().is_empty());
        assert_eq!(scheduler.live_registrations(), 0);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let scheduler = ManualTickScheduler::new();
        let sink = Arc::new(RecordingSink::default());
        let handle = scheduler
            .schedule(2_000, 1_000, Arc::clone(&sink) as Arc<dyn TickSink>)
            .unwrap();
        drop(handle);

        assert_eq!(scheduler.fire_tick(), 0);
        assert_eq!(scheduler.delivered_callbacks(), 0);
    }

    #[test]
    fn test_uneven_total_saturates_to_finish() {
        let scheduler = ManualTickScheduler::new();
        let sink = Arc::new(RecordingSink::default());
        let _handle = scheduler
            .schedule(2_500, 1_000, Arc::clone(&sink) as Arc<dyn TickSink>)
            .unwrap();

        scheduler.advance(3);
        assert_eq!(*sink.ticks.lock().unwrap(), vec![1_500, 500]);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stub_time_source_is_monotonic() {
        let source = StubTimeSource::new();
        let first = source.now();
        let second = source.now();
        assert!(second > first);
        assert_eq!(second.duration_since(first), Duration::from_millis(10));
    }
}
