use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use hourglass_core::Scheduler;

use crate::base::{Run, Timer, TimerBase};

struct CountdownState {
    base: TimerBase<CountdownTimer>,
    duration: Cell<f32>,
    realtime: Cell<bool>,
}

impl Drop for CountdownState {
    fn drop(&mut self) {
        self.base.release();
    }
}

/// A timer that counts down from a duration to zero, then stops itself.
///
/// Cloning yields another handle to the same timer.
///
/// ```rust,ignore
/// let countdown = CountdownTimer::new(&scheduler, 2.0);
/// countdown.on_stop(|timer| timer.restart());
/// countdown.on_stop(|_| log::info!("2 seconds passed"));
/// countdown.start();
/// ```
#[derive(Clone)]
pub struct CountdownTimer {
    state: Rc<CountdownState>,
}

impl CountdownTimer {
    /// Creates an idle countdown. Negative durations are clamped to zero.
    #[must_use]
    pub fn new(scheduler: &Scheduler, duration: f32) -> Self {
        let timer = Self {
            state: Rc::new(CountdownState {
                base: TimerBase::new(scheduler),
                duration: Cell::new(0.0),
                realtime: Cell::new(false),
            }),
        };
        timer.set_duration(duration);
        timer
    }

    /// A one second countdown.
    #[must_use]
    pub fn one(scheduler: &Scheduler) -> Self {
        Self::new(scheduler, 1.0)
    }

    /// Seconds the timer counts down from.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.state.duration.get()
    }

    /// Negative (or NaN) input is clamped to zero.
    pub fn set_duration(&self, duration: f32) {
        let duration = if duration >= 0.0 { duration } else { 0.0 };
        self.state.duration.set(duration);
    }

    /// Whether the countdown ignores the global time scale.
    #[must_use]
    pub fn realtime(&self) -> bool {
        self.state.realtime.get()
    }

    pub fn set_realtime(&self, realtime: bool) {
        self.state.realtime.set(realtime);
    }

    /// Seconds left until the countdown finishes, within `[0, duration]`.
    #[must_use]
    pub fn time_remaining(&self) -> f32 {
        let duration = self.duration();
        (duration - self.elapsed_time()).clamp(0.0, duration)
    }

    fn from_state(state: Rc<CountdownState>) -> Self {
        Self { state }
    }
}

impl Timer for CountdownTimer {
    fn base(&self) -> &TimerBase<Self> {
        &self.state.base
    }

    fn start_with(&self, trigger_events: bool) {
        let weak = Rc::downgrade(&self.state);
        self.state
            .base
            .launch(self, trigger_events, move |run| count_down(weak, run));
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("base", &self.state.base)
            .field("duration", &self.duration())
            .field("realtime", &self.realtime())
            .finish()
    }
}

/// Ticks until the countdown runs out, then stops it. The run ends silently if
/// it is cancelled or replaced first; in that case whoever cancelled it has
/// already fired `on_stop`, so it fires exactly once per run either way.
async fn count_down(weak: Weak<CountdownState>, mut run: Run) {
    loop {
        {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if !run.is_current(&state.base) {
                return;
            }
            let timer = CountdownTimer::from_state(state);
            if !timer.is_running() || timer.time_remaining() <= 0.0 {
                log::debug!("Countdown of {}s finished", timer.duration());
                timer.cancel_with(true);
                return;
            }
        }

        let Ok(time) = run.next_frame().await else {
            return;
        };

        let Some(state) = weak.upgrade() else {
            return;
        };
        if !run.is_current(&state.base) {
            return;
        }
        let timer = CountdownTimer::from_state(state);
        if let Some(delta) = timer.base().accumulation_delta(&time, timer.realtime()) {
            timer.base().add_elapsed(delta);
            timer.events().on_tick.emit(&timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourglass_core::FrameScheduler;

    #[test]
    fn negative_duration_is_clamped() {
        let frames = FrameScheduler::new();
        let countdown = CountdownTimer::new(&frames.handle(), -5.0);
        assert_eq!(countdown.duration(), 0.0);

        countdown.set_duration(f32::NAN);
        assert_eq!(countdown.duration(), 0.0);
    }

    #[test]
    fn time_remaining_is_full_duration_before_start() {
        let frames = FrameScheduler::new();
        let countdown = CountdownTimer::one(&frames.handle());
        assert_eq!(countdown.time_remaining(), 1.0);
        assert!(!countdown.is_running());
    }

    #[test]
    fn dropping_last_handle_releases_the_run() {
        let mut frames = FrameScheduler::new();
        let countdown = CountdownTimer::new(&frames.handle(), 10.0);
        countdown.start();
        let state = Rc::downgrade(&countdown.state);

        drop(countdown);
        assert!(state.upgrade().is_none());
        // The orphaned task wakes, fails to upgrade and exits.
        frames.advance(std::time::Duration::from_millis(250));
    }
}
