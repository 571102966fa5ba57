use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use hourglass_core::{Event, ListenerId, Scheduler};

use crate::base::{Run, Timer, TimerBase};

struct StopwatchState {
    base: TimerBase<StopwatchTimer>,
    lap_time: Cell<f32>,
    laps: RefCell<Vec<f32>>,
    realtime: Cell<bool>,
    on_lap: Event<StopwatchTimer>,
}

impl Drop for StopwatchState {
    fn drop(&mut self) {
        self.base.release();
    }
}

/// A timer that counts up until cancelled and records lap times.
///
/// Total time is [`Timer::elapsed_time`]; [`lap_time`](Self::lap_time) is the
/// time of the lap in progress.
#[derive(Clone)]
pub struct StopwatchTimer {
    state: Rc<StopwatchState>,
}

impl StopwatchTimer {
    #[must_use]
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            state: Rc::new(StopwatchState {
                base: TimerBase::new(scheduler),
                lap_time: Cell::new(0.0),
                laps: RefCell::new(Vec::new()),
                realtime: Cell::new(false),
                on_lap: Event::new(),
            }),
        }
    }

    /// Seconds accumulated since the last lap (or since start).
    #[must_use]
    pub fn lap_time(&self) -> f32 {
        self.state.lap_time.get()
    }

    /// Recorded laps, oldest first.
    #[must_use]
    pub fn laps(&self) -> Vec<f32> {
        self.state.laps.borrow().clone()
    }

    #[must_use]
    pub fn lap_count(&self) -> usize {
        self.state.laps.borrow().len()
    }

    /// Whether the stopwatch ignores the global time scale.
    #[must_use]
    pub fn realtime(&self) -> bool {
        self.state.realtime.get()
    }

    pub fn set_realtime(&self, realtime: bool) {
        self.state.realtime.set(realtime);
    }

    /// Records the current lap and starts a new one.
    pub fn lap(&self) {
        self.lap_with(true);
    }

    /// Records the current lap. No-op while not running.
    pub fn lap_with(&self, trigger_events: bool) {
        if !self.is_running() {
            return;
        }
        let lap = self.state.lap_time.replace(0.0);
        self.state.laps.borrow_mut().push(lap);
        log::debug!("Stopwatch lap {} recorded: {lap}s", self.lap_count());

        if trigger_events {
            self.state.on_lap.emit(self);
        }
    }

    /// Event fired after each recorded lap.
    #[must_use]
    pub fn lap_event(&self) -> &Event<StopwatchTimer> {
        &self.state.on_lap
    }

    pub fn on_lap<F: Fn(&Self) + 'static>(&self, callback: F) -> ListenerId {
        self.state.on_lap.subscribe(callback)
    }

    fn from_state(state: Rc<StopwatchState>) -> Self {
        Self { state }
    }
}

impl Timer for StopwatchTimer {
    fn base(&self) -> &TimerBase<Self> {
        &self.state.base
    }

    fn start_with(&self, trigger_events: bool) {
        let state = &self.state;
        state.base.launch(self, trigger_events, |run| {
            state.lap_time.set(0.0);
            run_stopwatch(Rc::downgrade(state), run)
        });
    }

    fn dispose(&self) {
        if self.state.base.dispose() {
            self.state.laps.borrow_mut().clear();
            self.state.lap_time.set(0.0);
            self.state.on_lap.clear();
        }
    }
}

impl fmt::Debug for StopwatchTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopwatchTimer")
            .field("base", &self.state.base)
            .field("lap_time", &self.lap_time())
            .field("laps", &self.state.laps.borrow())
            .field("realtime", &self.realtime())
            .finish()
    }
}

/// Ticks until the run is cancelled or replaced. The stopwatch has no natural
/// end, so whoever cancels it fires `on_stop`.
async fn run_stopwatch(weak: Weak<StopwatchState>, mut run: Run) {
    loop {
        let Ok(time) = run.next_frame().await else {
            return;
        };

        let Some(state) = weak.upgrade() else {
            return;
        };
        if !run.is_current(&state.base) {
            return;
        }
        let timer = StopwatchTimer::from_state(state);
        if let Some(delta) = timer.base().accumulation_delta(&time, timer.realtime()) {
            timer.state.lap_time.set(timer.lap_time() + delta);
            timer.base().add_elapsed(delta);
            timer.events().on_tick.emit(&timer);
        }
    }
}
