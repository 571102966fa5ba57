//! # Hourglass
//!
//! Frame-driven timers for game loops: countdowns, stopwatches with laps and
//! one-shot delays, all advanced once per host frame with pause/resume,
//! time-scale awareness and lifecycle events.
//!
//! This umbrella crate re-exports the workspace crates:
//!
//! - [`core`]: frame scheduler, frame time, cancellation, events, settings
//! - [`timers`]: [`CountdownTimer`], [`StopwatchTimer`], [`one_shot`] delays
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hourglass::prelude::*;
//!
//! let mut frames = FrameScheduler::new();
//! let scheduler = frames.handle();
//!
//! let countdown = CountdownTimer::new(&scheduler, 2.0);
//! countdown.on_stop(|timer| timer.restart());
//! countdown.start();
//!
//! let stopwatch = StopwatchTimer::new(&scheduler);
//! stopwatch.on_lap(|timer| log::info!("{} laps", timer.lap_count()));
//! stopwatch.start();
//!
//! loop {
//!     frames.tick();
//! }
//! ```

pub use hourglass_core as core;
pub use hourglass_timers as timers;

pub use hourglass_core::{
    CancelSource, CancelToken, Event, FrameScheduler, FrameTime, HourglassError, ListenerId,
    Result, Scheduler, SchedulerSettings,
};
pub use hourglass_timers::{CountdownTimer, StopwatchTimer, Timer, TimerEvents, one_shot};

/// Everything needed to drive and use timers.
pub mod prelude {
    pub use hourglass_core::{CancelSource, CancelToken, FrameScheduler, Scheduler};
    pub use hourglass_timers::{CountdownTimer, StopwatchTimer, Timer, one_shot};
}
