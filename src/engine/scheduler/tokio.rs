//! Tokio-backed scheduler driving real-time countdowns.
//!
//! Each registration runs on a dedicated thread with its own current-thread
//! runtime, so scheduling works no matter what runtime (if any) the caller
//! is on. Cancellation is a flag checked at every interval boundary; the
//! worker exits on its own and is never joined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::TimerError;

use super::{ScheduleHandle, TickScheduler, TickSink};

/// Production scheduler backed by `tokio::time::interval`.
///
/// The first callback lands one full interval after scheduling; the final
/// interval delivers `on_finish` instead of a zero-remaining tick.
#[derive(Default)]
pub struct TokioTickScheduler;

impl TokioTickScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl TickScheduler for TokioTickScheduler {
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
        let flag = Arc::clone(&cancelled);

        tracing::debug!(
            "[TickScheduler] arming countdown: total={}ms interval={}ms",
            total_millis,
            interval_millis
        );

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime for countdown ticks");

            rt.block_on(async move {
                let mut remaining = total_millis;
                let mut ticker =
                    tokio::time::interval(Duration::from_millis(interval_millis));
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                // interval yields immediately once; consume that so the
                // first callback lands one interval in.
                ticker.tick().await;

                loop {
                    ticker.tick().await;
                    if flag.load(Ordering::SeqCst) {
                        tracing::debug!("[TickScheduler] registration cancelled, worker exiting");
                        break;
                    }
                    remaining = remaining.saturating_sub(interval_millis);
                    if remaining == 0 {
                        sink.on_finish();
                        break;
                    }
                    sink.on_tick(remaining);
                }
            });
        });

        Ok(Box::new(TokioScheduleHandle { cancelled }))
    }
}

struct TokioScheduleHandle {
    cancelled: Arc<AtomicBool>,
}

impl ScheduleHandle for TokioScheduleHandle {
    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Drop for TokioScheduleHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    struct CountingSink {
        ticks: AtomicU64,
        finishes: AtomicU64,
    }

    impl CountingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ticks: AtomicU64::new(0),
                finishes: AtomicU64::new(0),
            })
        }
    }

    impl TickSink for CountingSink {
        fn on_tick(&self, _remaining_millis: u64) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_finish(&self) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let scheduler = TokioTickScheduler::new();
        let sink = CountingSink::new();
        let result = scheduler.schedule(1_000, 0, sink);
        assert_eq!(
            result.err(),
            Some(TimerError::IntervalInvalid { interval_ms: 0 })
        );
    }

    #[test]
    fn test_cancel_before_first_boundary_delivers_nothing() {
        let scheduler = TokioTickScheduler::new();
        let sink = CountingSink::new();
        let mut handle = scheduler
            .schedule(500, 100, Arc::clone(&sink) as Arc<dyn TickSink>)
            .unwrap();
        handle.cancel();

        // The worker sees the flag at its first 100ms boundary and exits.
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(sink.ticks.load(Ordering::SeqCst), 0);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_countdown_runs_to_finish() {
        let scheduler = TokioTickScheduler::new();
        let sink = CountingSink::new();
        let _handle = scheduler
            .schedule(300, 100, Arc::clone(&sink) as Arc<dyn TickSink>)
            .unwrap();

        // 300ms at 100ms per tick: two ticks, then finish around 300ms.
        std::thread::sleep(Duration::from_millis(700));
        assert_eq!(sink.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
    }
}
