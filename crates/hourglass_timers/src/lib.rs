//! # Hourglass Timers
//!
//! Frame-driven timers built on the [`hourglass_core`] scheduler:
//!
//! - [`CountdownTimer`]: counts down from a duration, then stops itself
//! - [`StopwatchTimer`]: counts up until cancelled, records laps
//! - [`one_shot`]: stateless "call this after N seconds" helpers
//!
//! Both stateful timers share the [`Timer`] trait (start / cancel / pause /
//! restart / dispose) and the lifecycle events in [`TimerEvents`].
//!
//! # Example
//!
//! ```rust,ignore
//! use hourglass_core::FrameScheduler;
//! use hourglass_timers::{CountdownTimer, Timer};
//!
//! let mut frames = FrameScheduler::new();
//! let countdown = CountdownTimer::new(&frames.handle(), 2.0);
//! countdown.on_stop(|_| log::info!("2 seconds passed"));
//! countdown.start();
//!
//! loop {
//!     frames.tick();
//! }
//! ```
//!
//! Everything runs on the host thread: callbacks are invoked synchronously
//! from inside [`FrameScheduler::advance`](hourglass_core::FrameScheduler::advance)
//! or from the timer method that triggered them.

pub mod base;
pub mod countdown;
pub mod one_shot;
pub mod stopwatch;

pub use base::{Timer, TimerBase, TimerEvents};
pub use countdown::CountdownTimer;
pub use stopwatch::StopwatchTimer;
