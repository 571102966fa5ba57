//! # Hourglass Core
//!
//! Host-boundary building blocks for the Hourglass timers:
//!
//! - [`FrameScheduler`] / [`Scheduler`]: the frame tick source and the
//!   single-threaded executor cooperative timer tasks run on
//! - [`FrameTime`] / [`Clock`]: per-frame scaled and unscaled deltas
//! - [`CancelSource`] / [`CancelToken`]: cooperative cancellation
//! - [`Event`]: ordered multicast callbacks with explicit unsubscribe
//! - [`SchedulerSettings`]: scheduler configuration
//! - [`HourglassError`]: error type for the host boundary

pub mod cancel;
pub mod errors;
pub mod event;
pub mod scheduler;
pub mod settings;
pub mod time;

pub use cancel::{CancelSource, CancelToken, Registration};
pub use errors::{HourglassError, Result};
pub use event::{Event, ListenerId};
pub use scheduler::{FrameScheduler, NextFrame, Scheduler, WaitRealtime};
pub use settings::SchedulerSettings;
pub use time::{Clock, FrameTime};
