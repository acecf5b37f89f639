//! CountdownEngine: reusable countdown orchestration layer.
//!
//! This struct owns the timer state machine, exposing trait-based tick
//! scheduling, a `watch` channel of state snapshots, and a `broadcast`
//! channel of lifecycle events shared across CLI and FFI entry points.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

use crate::config::AppConfig;
use crate::engine::scheduler::{
    ScheduleHandle, SystemTimeSource, TickScheduler, TickSink, TimeSource, TokioTickScheduler,
};
use crate::error::{log_timer_error, TimerError};
use crate::timer::{TimeOperator, TimeUnit, TimerState};

#[path = "core_streams.rs"]
mod core_streams;

/// Lifecycle event emitted by the engine core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEvent {
    pub timestamp_ms: u64,
    pub kind: TimerEventKind,
}

/// Types of lifecycle events supported by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimerEventKind {
    Started { total_duration_millis: u64 },
    Finished,
    Cancelled,
}

/// CountdownEngine orchestrates the countdown state machine and its channels.
pub struct CountdownEngine {
    config: Arc<RwLock<AppConfig>>,
    scheduler: Arc<dyn TickScheduler>,
    inner: Arc<EngineInner>,
}

/// State shared between the engine handle and in-flight tick callbacks.
struct EngineInner {
    state: Mutex<TimerState>,
    active: Mutex<Option<Box<dyn ScheduleHandle>>>,
    generation: AtomicU64,
    tick_count: AtomicU64,
    log_every_n_ticks: u64,
    state_tx: watch::Sender<TimerState>,
    // Kept alive so publishing works before the first subscriber appears.
    _state_rx: watch::Receiver<TimerState>,
    event_tx: broadcast::Sender<TimerEvent>,
    time_source: Arc<dyn TimeSource>,
    start_instant: Instant,
}

impl CountdownEngine {
    /// Create a new CountdownEngine with platform defaults.
    pub fn new() -> Self {
        let initial_config = Self::load_platform_config();
        Self::from_config(initial_config)
    }

    fn from_config(initial_config: AppConfig) -> Self {
        Self::from_parts(
            initial_config,
            Arc::new(TokioTickScheduler::new()),
            Arc::new(SystemTimeSource::default()),
        )
    }

    /// Assemble an engine from explicit parts. Tests and tooling inject a
    /// manual scheduler and stub time source here.
    pub fn from_parts(
        initial_config: AppConfig,
        scheduler: Arc<dyn TickScheduler>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(TimerState::new_idle());
        let (event_tx, _) = broadcast::channel(initial_config.channels.event_capacity.max(1));
        let log_every_n_ticks = initial_config.timer.log_every_n_ticks;

        Self {
            config: Arc::new(RwLock::new(initial_config)),
            scheduler,
            inner: Arc::new(EngineInner {
                state: Mutex::new(TimerState::new_idle()),
                active: Mutex::new(None),
                generation: AtomicU64::new(0),
                tick_count: AtomicU64::new(0),
                log_every_n_ticks,
                state_tx,
                _state_rx: state_rx,
                event_tx,
                time_source,
                start_instant: Instant::now(),
            }),
        }
    }

    fn load_platform_config() -> AppConfig {
        #[cfg(target_os = "android")]
        {
            AppConfig::load_android()
        }

        #[cfg(not(target_os = "android"))]
        {
            AppConfig::load()
        }
    }

    fn tick_interval_ms(&self) -> u64 {
        self.config
            .read()
            .map(|cfg| cfg.timer.tick_interval_ms)
            .unwrap_or_else(|err| err.into_inner().timer.tick_interval_ms)
    }

    // ========================================================================
    // TIMER OPERATIONS
    // ========================================================================

    /// Step one duration field up or down while idle.
    ///
    /// Values clamp at their bounds (hours 0-23, minutes and seconds 0-59)
    /// without borrowing from neighbouring fields. Adjustments while a
    /// countdown is running are ignored, and a clamped no-op publishes
    /// nothing.
    pub fn adjust_field(&self, unit: TimeUnit, op: TimeOperator) -> Result<(), TimerError> {
        let mut state = self.inner.lock_state()?;
        if state.is_running {
            debug!(
                "[CountdownEngine] adjust ignored while running: {:?} {:?}",
                unit, op
            );
            return Ok(());
        }
        if !state.adjust(unit, op) {
            return Ok(());
        }

        let snapshot = state.clone();
        self.inner.publish_state(snapshot);
        Ok(())
    }

    /// Arm the countdown from the currently configured duration.
    ///
    /// Starting while a countdown is already running re-arms atomically:
    /// observers see a single transition into the new run, with no
    /// intermediate paused state and no Cancelled event. Starting with a
    /// zero duration is a complete no-op that leaves any active run alone.
    pub fn start(&self) -> Result<(), TimerError> {
        let interval_ms = self.tick_interval_ms();
        if interval_ms == 0 {
            return Err(TimerError::IntervalInvalid { interval_ms });
        }

        let mut state = self.inner.lock_state()?;
        let total_duration_millis = state.configured_duration_millis();
        if total_duration_millis == 0 {
            debug!("[CountdownEngine] start ignored: configured duration is zero");
            return Ok(());
        }

        // Invalidate any previous registration before the new one is armed,
        // so its remaining callbacks are dropped as stale.
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut active = self.inner.lock_active()?;
        if let Some(mut previous) = active.take() {
            previous.cancel();
        }

        let sink: Arc<dyn TickSink> = Arc::new(TickRelay {
            inner: Arc::clone(&self.inner),
            generation,
        });
        match self
            .scheduler
            .schedule(total_duration_millis, interval_ms, sink)
        {
            Ok(handle) => *active = Some(handle),
            Err(err) => {
                // The previous registration is already torn down.
                state.is_running = false;
                let snapshot = state.clone();
                self.inner.publish_state(snapshot);
                return Err(err);
            }
        }
        drop(active);

        state.is_running = true;
        state.total_duration_millis = total_duration_millis;
        let snapshot = state.clone();
        self.inner.publish_state(snapshot);
        self.inner
            .emit_event(TimerEventKind::Started {
                total_duration_millis,
            });
        Ok(())
    }

    /// Stop the active countdown, freezing the fields where they stand.
    ///
    /// The frozen values become the configured duration for the next start,
    /// which makes cancel double as a pause. Cancelling an idle engine is a
    /// silent no-op.
    pub fn cancel(&self) -> Result<(), TimerError> {
        let mut state = self.inner.lock_state()?;
        if !state.is_running {
            return Ok(());
        }

        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(mut active) = self.inner.lock_active()?.take() {
            active.cancel();
        }

        state.is_running = false;
        let snapshot = state.clone();
        self.inner.publish_state(snapshot);
        self.inner.emit_event(TimerEventKind::Cancelled);
        Ok(())
    }

    /// Release the engine's scheduling resources.
    ///
    /// Equivalent to [CountdownEngine::cancel]; hosts call this when the
    /// owning screen goes away. Dropping the engine disposes it too.
    pub fn dispose(&self) -> Result<(), TimerError> {
        debug!("[CountdownEngine] dispose: tearing down any active schedule");
        self.cancel()
    }
}

// ========================================================================
// TICK DELIVERY
// ========================================================================

/// Bridges scheduler callbacks back into the engine, stamped with the
/// generation they were armed under so stale deliveries can be rejected.
struct TickRelay {
    inner: Arc<EngineInner>,
    generation: u64,
}

impl TickSink for TickRelay {
    fn on_tick(&self, remaining_millis: u64) {
        self.inner.apply_tick(self.generation, remaining_millis);
    }

    fn on_finish(&self) {
        self.inner.apply_finish(self.generation);
    }
}

impl EngineInner {
    fn lock_state(&self) -> Result<MutexGuard<'_, TimerState>, TimerError> {
        self.state.lock().map_err(|_| TimerError::LockPoisoned {
            component: "timer_state".to_string(),
        })
    }

    fn lock_active(&self) -> Result<MutexGuard<'_, Option<Box<dyn ScheduleHandle>>>, TimerError> {
        self.active.lock().map_err(|_| TimerError::LockPoisoned {
            component: "active_schedule".to_string(),
        })
    }

    fn publish_state(&self, snapshot: TimerState) {
        if self.state_tx.send(snapshot).is_err() {
            debug!("[CountdownEngine] state publish skipped: channel closed");
        }
    }

    fn emit_event(&self, kind: TimerEventKind) {
        let timestamp_ms = self
            .time_source
            .now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64;
        let _ = self.event_tx.send(TimerEvent { timestamp_ms, kind });
    }

    /// Apply one tick delivered by the scheduler. Ticks carrying a stale
    /// generation are dropped without touching the state.
    fn apply_tick(&self, generation: u64, remaining_millis: u64) {
        let mut state = match self.lock_state() {
            Ok(guard) => guard,
            Err(err) => {
                log_timer_error(&err, "apply_tick");
                return;
            }
        };
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!(
                "[CountdownEngine] dropping stale tick: remaining={}ms",
                remaining_millis
            );
            return;
        }
        if !state.is_running {
            return;
        }

        state.apply_remaining(remaining_millis);
        let snapshot = state.clone();
        self.publish_state(snapshot);

        let applied = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        if self.log_every_n_ticks > 0 && applied % self.log_every_n_ticks == 0 {
            debug!(
                "[CountdownEngine] {} ticks applied, remaining={}ms",
                applied, remaining_millis
            );
        }
    }

    /// Apply the scheduler's finish callback for a natural completion.
    fn apply_finish(&self, generation: u64) {
        let mut state = match self.lock_state() {
            Ok(guard) => guard,
            Err(err) => {
                log_timer_error(&err, "apply_finish");
                return;
            }
        };
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!("[CountdownEngine] dropping stale finish");
            return;
        }
        if !state.is_running {
            return;
        }

        // The registration is spent; nothing after this may re-use it.
        self.generation.fetch_add(1, Ordering::SeqCst);
        let spent = match self.lock_active() {
            Ok(mut active) => active.take(),
            Err(err) => {
                log_timer_error(&err, "apply_finish");
                None
            }
        };
        drop(spent);

        state.apply_remaining(0);
        // Completion shows the ring full again rather than empty.
        state.progress = 1.0;
        state.is_running = false;
        let snapshot = state.clone();
        self.publish_state(snapshot);
        self.emit_event(TimerEventKind::Finished);
    }
}

// ========================================================================
// TEST HELPERS
// ========================================================================


impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        if let Err(err) = self.cancel() {
            log_timer_error(&err, "drop");
        }
    }
}
