//! Timer State Machine
//!
//! [`TimerBase`] holds the state every timer shares (running / paused /
//! elapsed, the cancellation source of the current run, lifecycle events) and
//! the [`Timer`] trait implements the shared operations on top of it.
//!
//! # States
//!
//! ```text
//!            start                pause(true)
//!   Idle ───────────▶ Running ◀──────────────▶ Paused
//!    ▲                   │      pause(false)      │
//!    └───── cancel / natural completion ◀─────────┘
//!
//!   any state ── dispose ──▶ Disposed (terminal)
//! ```
//!
//! # Runs
//!
//! Every `start` creates a fresh [`CancelSource`] and bumps a generation
//! counter, then spawns one cooperative task on the [`Scheduler`]. The task
//! holds a `Run` and must check `Run::is_current` after every suspension:
//! a cancelled or superseded run stops without touching the timer again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;

use hourglass_core::{CancelSource, CancelToken, Event, FrameTime, ListenerId, Result, Scheduler};

/// The five lifecycle events shared by all timers.
///
/// Listeners receive the timer handle that fired the event.
pub struct TimerEvents<T> {
    /// Fires when the timer starts.
    pub on_start: Event<T>,
    /// Fires every frame the timer accumulates time.
    pub on_tick: Event<T>,
    /// Fires when the timer is cancelled or completes.
    pub on_stop: Event<T>,
    /// Fires when the timer is paused.
    pub on_pause: Event<T>,
    /// Fires when the timer resumes from a pause.
    pub on_resume: Event<T>,
}

impl<T> Default for TimerEvents<T> {
    fn default() -> Self {
        Self {
            on_start: Event::new(),
            on_tick: Event::new(),
            on_stop: Event::new(),
            on_pause: Event::new(),
            on_resume: Event::new(),
        }
    }
}

impl<T> TimerEvents<T> {
    pub fn clear(&self) {
        self.on_start.clear();
        self.on_tick.clear();
        self.on_stop.clear();
        self.on_pause.clear();
        self.on_resume.clear();
    }
}

/// Token of one timer run, owned by the run's task.
pub(crate) struct Run {
    scheduler: Scheduler,
    token: CancelToken,
    generation: u64,
    last_frame: u64,
}

impl Run {
    /// Suspends until the next frame. Fails once the run is cancelled.
    pub(crate) async fn next_frame(&mut self) -> Result<FrameTime> {
        let time = self.scheduler.next_frame(self.last_frame, &self.token).await?;
        self.last_frame = time.frame;
        Ok(time)
    }

    /// `true` while this run has not been cancelled or replaced.
    #[must_use]
    pub(crate) fn is_current<T>(&self, base: &TimerBase<T>) -> bool {
        !self.token.is_cancelled() && base.generation.get() == self.generation
    }
}

/// State shared by every timer type. `T` is the timer handle events are
/// emitted with.
pub struct TimerBase<T> {
    scheduler: Scheduler,
    running: Cell<bool>,
    paused: Cell<bool>,
    elapsed: Cell<f32>,
    disposed: Cell<bool>,
    generation: Cell<u64>,
    cancel: RefCell<Option<CancelSource>>,
    events: TimerEvents<T>,
}

impl<T> TimerBase<T> {
    #[must_use]
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            running: Cell::new(false),
            paused: Cell::new(false),
            elapsed: Cell::new(0.0),
            disposed: Cell::new(false),
            generation: Cell::new(0),
            cancel: RefCell::new(None),
            events: TimerEvents::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &TimerEvents<T> {
        &self.events
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Elapsed time of the current (or last) run, in seconds.
    #[inline]
    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed.get()
    }

    pub(crate) fn add_elapsed(&self, delta: f32) {
        self.elapsed.set(self.elapsed.get() + delta);
    }

    pub(crate) fn reset_elapsed(&self) {
        self.elapsed.set(0.0);
    }

    /// Delta to accumulate for this frame, or `None` when the tick is skipped
    /// (paused, or scaled time frozen for a non-realtime timer).
    #[must_use]
    pub fn accumulation_delta(&self, time: &FrameTime, realtime: bool) -> Option<f32> {
        if self.paused.get() || (!realtime && time.is_frozen()) {
            return None;
        }
        Some(time.delta_for(realtime))
    }

    /// Idle → Running. Replaces the cancellation source and returns the new
    /// run, or `None` if the timer is already running or disposed.
    fn begin_run(&self) -> Option<Run> {
        if self.disposed.get() {
            log::warn!("Ignoring start of a disposed timer");
            return None;
        }
        if self.running.replace(true) {
            return None;
        }
        self.paused.set(false);

        let source = CancelSource::new();
        let token = source.token();
        if let Some(stale) = self.cancel.replace(Some(source)) {
            stale.cancel();
        }
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        Some(Run {
            scheduler: self.scheduler.clone(),
            token,
            generation,
            last_frame: self.scheduler.frame(),
        })
    }

    /// Starts a run and spawns its task. `task` is only invoked when the timer
    /// actually transitions to Running.
    pub(crate) fn launch<F, Fut>(&self, owner: &T, trigger_events: bool, task: F)
    where
        F: FnOnce(Run) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let Some(run) = self.begin_run() else {
            return;
        };
        let generation = run.generation;

        if let Err(err) = self.scheduler.spawn(task(run)) {
            log::error!("Failed to launch timer run {generation}: {err}");
            self.end_run();
            return;
        }
        log::debug!("Timer run {generation} started");

        if trigger_events {
            self.events.on_start.emit(owner);
        }
    }

    /// Running/Paused → Idle. Returns `false` if the timer was not running.
    pub(crate) fn end_run(&self) -> bool {
        if !self.running.replace(false) {
            return false;
        }
        self.paused.set(false);
        self.release();
        log::debug!("Timer run {} stopped", self.generation.get());
        true
    }

    /// Returns `true` if the pause state actually changed.
    pub(crate) fn set_paused(&self, pause: bool) -> bool {
        if !self.running.get() || self.paused.get() == pause {
            return false;
        }
        self.paused.set(pause);
        true
    }

    /// Cancels and drops the cancellation source of the current run.
    pub(crate) fn release(&self) {
        if let Some(source) = self.cancel.borrow_mut().take() {
            source.cancel();
        }
    }

    /// Terminal cleanup. Returns `false` if already disposed.
    pub(crate) fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        self.release();
        self.running.set(false);
        self.paused.set(false);
        self.events.clear();
        log::debug!("Timer disposed");
        true
    }
}

impl<T> fmt::Debug for TimerBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerBase")
            .field("running", &self.running.get())
            .field("paused", &self.paused.get())
            .field("elapsed", &self.elapsed.get())
            .field("disposed", &self.disposed.get())
            .finish_non_exhaustive()
    }
}

/// Shared timer operations.
///
/// Implementors provide [`base`](Timer::base) and [`start_with`](Timer::start_with);
/// everything else has a default built on [`TimerBase`]. The plain methods use
/// the default event behaviour, the `*_with` variants take it explicitly.
pub trait Timer: Sized + 'static {
    fn base(&self) -> &TimerBase<Self>;

    /// Starts the timer. No-op if it is already running or was disposed.
    fn start_with(&self, trigger_events: bool);

    /// Stops the timer so it can be started again. No-op if not running.
    fn cancel_with(&self, trigger_events: bool) {
        if self.base().end_run() && trigger_events {
            self.base().events().on_stop.emit(self);
        }
    }

    /// Pauses (`true`) or resumes (`false`) without resetting elapsed time.
    /// No-op if not running or already in the requested state.
    fn pause_with(&self, pause: bool, trigger_events: bool) {
        if !self.base().set_paused(pause) || !trigger_events {
            return;
        }
        let events = self.base().events();
        if pause {
            events.on_pause.emit(self);
        } else {
            events.on_resume.emit(self);
        }
    }

    /// Cancels, resets elapsed time to zero and starts again, passing
    /// `trigger_events` to both halves.
    fn restart_with(&self, trigger_events: bool) {
        self.cancel_with(trigger_events);
        self.base().reset_elapsed();
        self.start_with(trigger_events);
    }

    /// Cancels the current run without events, drops every listener and
    /// blocks further starts. Idempotent.
    fn dispose(&self) {
        self.base().dispose();
    }

    fn start(&self) {
        self.start_with(true);
    }

    fn cancel(&self) {
        self.cancel_with(true);
    }

    fn pause(&self, pause: bool) {
        self.pause_with(pause, true);
    }

    /// Restarts without firing stop/start events.
    fn restart(&self) {
        self.restart_with(false);
    }

    fn is_running(&self) -> bool {
        self.base().is_running()
    }

    fn is_paused(&self) -> bool {
        self.base().is_paused()
    }

    fn is_disposed(&self) -> bool {
        self.base().is_disposed()
    }

    fn elapsed_time(&self) -> f32 {
        self.base().elapsed_time()
    }

    fn events(&self) -> &TimerEvents<Self> {
        self.base().events()
    }

    fn on_start<F: Fn(&Self) + 'static>(&self, callback: F) -> ListenerId {
        self.events().on_start.subscribe(callback)
    }

    fn on_tick<F: Fn(&Self) + 'static>(&self, callback: F) -> ListenerId {
        self.events().on_tick.subscribe(callback)
    }

    fn on_stop<F: Fn(&Self) + 'static>(&self, callback: F) -> ListenerId {
        self.events().on_stop.subscribe(callback)
    }

    fn on_pause<F: Fn(&Self) + 'static>(&self, callback: F) -> ListenerId {
        self.events().on_pause.subscribe(callback)
    }

    fn on_resume<F: Fn(&Self) + 'static>(&self, callback: F) -> ListenerId {
        self.events().on_resume.subscribe(callback)
    }
}
