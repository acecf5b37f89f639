//! Countdown engine: scheduler abstractions and the orchestration core.

pub mod core;
pub mod scheduler;

pub use core::{CountdownEngine, TimerEvent, TimerEventKind};
pub use scheduler::{
    ManualTickScheduler, ScheduleHandle, StubTimeSource, SystemTimeSource, TickScheduler,
    TickSink, TimeSource, TokioTickScheduler,
};
