#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Wall-clock source used by [`FrameScheduler::tick`](crate::FrameScheduler::tick)
/// to measure how long the previous frame took.
pub struct Clock {
    last_update: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a new clock starting from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
        }
    }

    /// Returns the time since the previous call (or since creation).
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        delta
    }
}

/// Snapshot of the frame timing state, published once per frame.
///
/// `delta` is scaled by `time_scale`; `unscaled_delta` is the raw frame time.
/// A `time_scale` of zero means the game is paused: scaled consumers stop
/// accumulating while realtime consumers keep going.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Scaled seconds since the previous frame.
    pub delta: f32,
    /// Raw seconds since the previous frame.
    pub unscaled_delta: f32,
    /// Global time scale in effect for this frame.
    pub time_scale: f32,
    /// Total scaled seconds since the scheduler was created.
    pub elapsed: f64,
    /// Total raw seconds since the scheduler was created.
    pub unscaled_elapsed: f64,
    /// Index of the current frame; 0 before the first tick.
    pub frame: u64,
}

impl Default for FrameTime {
    fn default() -> Self {
        Self {
            delta: 0.0,
            unscaled_delta: 0.0,
            time_scale: 1.0,
            elapsed: 0.0,
            unscaled_elapsed: 0.0,
            frame: 0,
        }
    }
}

impl FrameTime {
    /// Produces the snapshot for the next frame given its raw duration.
    #[must_use]
    pub fn next(&self, raw_delta: f32) -> Self {
        let delta = raw_delta * self.time_scale;
        Self {
            delta,
            unscaled_delta: raw_delta,
            time_scale: self.time_scale,
            elapsed: self.elapsed + f64::from(delta),
            unscaled_elapsed: self.unscaled_elapsed + f64::from(raw_delta),
            frame: self.frame + 1,
        }
    }

    /// Delta for a consumer that either follows or ignores the time scale.
    #[inline]
    #[must_use]
    pub fn delta_for(&self, realtime: bool) -> f32 {
        if realtime {
            self.unscaled_delta
        } else {
            self.delta
        }
    }

    /// `true` while the global time scale has frozen scaled time.
    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.time_scale <= 0.0
    }
}
