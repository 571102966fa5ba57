//! Frame Scheduler
//!
//! The [`FrameScheduler`] is the frame tick source that timers suspend on.
//! It owns a single-threaded executor ([`futures::executor::LocalPool`]) and the
//! published [`FrameTime`]. The host calls [`FrameScheduler::tick`] (wall
//! clock) or [`FrameScheduler::advance`] (explicit delta) once per frame; each
//! call publishes the new frame, wakes every task waiting for it, and runs all
//! ready tasks until they suspend again.
//!
//! Code that schedules work holds a cloneable [`Scheduler`] handle, which
//! exposes the two suspension points:
//! - [`Scheduler::next_frame`]: resolves on the first frame after a given one
//! - [`Scheduler::wait_realtime`]: resolves once N unscaled seconds have passed
//!
//! Both are cancelable through a [`CancelToken`] and resolve to
//! [`HourglassError::Cancelled`] once it is signalled.
//!
//! ```rust,ignore
//! let mut frames = FrameScheduler::new();
//! let scheduler = frames.handle();
//!
//! let token = CancelToken::never();
//! let start = scheduler.frame();
//! scheduler.spawn({
//!     let scheduler = scheduler.clone();
//!     async move {
//!         if let Ok(time) = scheduler.next_frame(start, &token).await {
//!             log::info!("frame {} took {}s", time.frame, time.delta);
//!         }
//!     }
//! })?;
//!
//! loop {
//!     frames.tick();
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::cancel::{CancelToken, Registration};
use crate::errors::{HourglassError, Result};
use crate::settings::SchedulerSettings;
use crate::time::{Clock, FrameTime};

new_key_type! {
    struct DeadlineKey;
}

struct Shared {
    time: Cell<FrameTime>,
    frame_waiters: RefCell<SmallVec<[Waker; 8]>>,
    // (deadline in unscaled seconds, waker)
    realtime_waiters: RefCell<SlotMap<DeadlineKey, (f64, Waker)>>,
}

impl Shared {
    fn wait_for_frame(&self, waker: &Waker) {
        let mut waiters = self.frame_waiters.borrow_mut();
        if !waiters.iter().any(|w| w.will_wake(waker)) {
            waiters.push(waker.clone());
        }
    }

    fn wait_for_deadline(&self, deadline: f64, waker: &Waker, slot: &mut Option<DeadlineKey>) {
        let mut waiters = self.realtime_waiters.borrow_mut();
        if let Some(key) = *slot
            && let Some((_, existing)) = waiters.get_mut(key)
        {
            if !existing.will_wake(waker) {
                existing.clone_from(waker);
            }
            return;
        }
        *slot = Some(waiters.insert((deadline, waker.clone())));
    }

    fn forget_deadline(&self, slot: &mut Option<DeadlineKey>) {
        if let Some(key) = slot.take() {
            self.realtime_waiters.borrow_mut().remove(key);
        }
    }

    fn wake_due(&self, time: &FrameTime) {
        let frame_waiters = std::mem::take(&mut *self.frame_waiters.borrow_mut());

        let mut due = SmallVec::<[Waker; 4]>::new();
        self.realtime_waiters.borrow_mut().retain(|_, (deadline, waker)| {
            if *deadline <= time.unscaled_elapsed {
                due.push(waker.clone());
                false
            } else {
                true
            }
        });

        for waker in frame_waiters.into_iter().chain(due) {
            waker.wake();
        }
    }
}

// ============================================================================
// FrameScheduler
// ============================================================================

/// Owner of the executor and the frame clock. Lives with the host loop.
pub struct FrameScheduler {
    pool: LocalPool,
    handle: Scheduler,
    clock: Clock,
    settings: SchedulerSettings,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::build(SchedulerSettings::default())
    }

    /// Creates a scheduler from validated settings.
    pub fn with_settings(settings: SchedulerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: SchedulerSettings) -> Self {
        let pool = LocalPool::new();
        let time = FrameTime {
            time_scale: settings.time_scale,
            ..FrameTime::default()
        };
        let handle = Scheduler {
            shared: Rc::new(Shared {
                time: Cell::new(time),
                frame_waiters: RefCell::default(),
                realtime_waiters: RefCell::default(),
            }),
            spawner: pool.spawner(),
        };
        Self {
            pool,
            handle,
            clock: Clock::new(),
            settings,
        }
    }

    /// Returns a handle for spawning tasks and querying time.
    #[must_use]
    pub fn handle(&self) -> Scheduler {
        self.handle.clone()
    }

    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Advances one frame using the wall time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let raw = self.clock.tick();
        self.advance(raw)
    }

    /// Advances one frame by `dt` of raw time and runs every task that became
    /// ready until it suspends again.
    pub fn advance(&mut self, dt: Duration) -> FrameTime {
        let raw = self.settings.clamp_delta(dt.as_secs_f32());
        let shared = &self.handle.shared;

        let time = shared.time.get().next(raw);
        shared.time.set(time);
        log::trace!(
            "frame {} advanced by {:.4}s (scaled {:.4}s)",
            time.frame,
            time.unscaled_delta,
            time.delta
        );

        shared.wake_due(&time);
        self.pool.run_until_stalled();
        time
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("time", &self.handle.time())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Scheduler handle
// ============================================================================

/// Cloneable handle to a [`FrameScheduler`].
#[derive(Clone)]
pub struct Scheduler {
    shared: Rc<Shared>,
    spawner: LocalSpawner,
}

impl Scheduler {
    /// Timing snapshot of the current frame.
    #[inline]
    #[must_use]
    pub fn time(&self) -> FrameTime {
        self.shared.time.get()
    }

    /// Index of the current frame.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.shared.time.get().frame
    }

    #[inline]
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.shared.time.get().time_scale
    }

    /// Sets the global time scale used from the next frame on.
    /// Negative or non-finite values freeze scaled time.
    pub fn set_time_scale(&self, scale: f32) {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        let mut time = self.shared.time.get();
        time.time_scale = scale;
        self.shared.time.set(time);
    }

    /// Queues a task on the local executor. It is first polled by the
    /// executor's next pass: the current one when spawned from inside a task
    /// or callback, otherwise the next [`FrameScheduler::advance`].
    pub fn spawn<F>(&self, task: F) -> Result<()>
    where
        F: Future<Output = ()> + 'static,
    {
        self.spawner.spawn_local(task)?;
        Ok(())
    }

    /// Suspends until a frame later than `after` has been published.
    ///
    /// Passing the frame observed when the work was scheduled (rather than
    /// the frame of the first poll) keeps the first resume on the very next
    /// frame.
    #[must_use]
    pub fn next_frame(&self, after: u64, token: &CancelToken) -> NextFrame {
        NextFrame {
            shared: Rc::clone(&self.shared),
            after,
            token: token.clone(),
            registration: Registration::default(),
        }
    }

    /// Suspends until `seconds` of unscaled time have passed, measured from
    /// the frame current when this is called (not when it is first polled).
    ///
    /// Negative and NaN durations count as zero. An infinite duration only
    /// resolves through cancellation.
    #[must_use]
    pub fn wait_realtime(&self, seconds: f32, token: &CancelToken) -> WaitRealtime {
        let seconds = if seconds > 0.0 { seconds } else { 0.0 };
        let deadline = self.shared.time.get().unscaled_elapsed + f64::from(seconds);
        WaitRealtime {
            shared: Rc::clone(&self.shared),
            deadline,
            token: token.clone(),
            registration: Registration::default(),
            slot: None,
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("time", &self.time())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Suspension futures
// ============================================================================

/// Future returned by [`Scheduler::next_frame`].
#[must_use = "futures do nothing unless awaited"]
pub struct NextFrame {
    shared: Rc<Shared>,
    after: u64,
    token: CancelToken,
    registration: Registration,
}

impl Future for NextFrame {
    type Output = Result<FrameTime>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.token.is_cancelled() {
            this.token.unregister(&mut this.registration);
            return Poll::Ready(Err(HourglassError::Cancelled));
        }
        let time = this.shared.time.get();
        if time.frame > this.after {
            this.token.unregister(&mut this.registration);
            return Poll::Ready(Ok(time));
        }
        this.shared.wait_for_frame(cx.waker());
        this.token.register(cx.waker(), &mut this.registration);
        Poll::Pending
    }
}

impl Drop for NextFrame {
    fn drop(&mut self) {
        self.token.unregister(&mut self.registration);
    }
}

/// Future returned by [`Scheduler::wait_realtime`].
#[must_use = "futures do nothing unless awaited"]
pub struct WaitRealtime {
    shared: Rc<Shared>,
    deadline: f64,
    token: CancelToken,
    registration: Registration,
    slot: Option<DeadlineKey>,
}

impl WaitRealtime {
    fn release(&mut self) {
        self.token.unregister(&mut self.registration);
        self.shared.forget_deadline(&mut self.slot);
    }
}

impl Future for WaitRealtime {
    type Output = Result<FrameTime>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.token.is_cancelled() {
            this.release();
            return Poll::Ready(Err(HourglassError::Cancelled));
        }
        let time = this.shared.time.get();
        if time.unscaled_elapsed >= this.deadline {
            this.release();
            return Poll::Ready(Ok(time));
        }
        this.shared
            .wait_for_deadline(this.deadline, cx.waker(), &mut this.slot);
        this.token.register(cx.waker(), &mut this.registration);
        Poll::Pending
    }
}

impl Drop for WaitRealtime {
    fn drop(&mut self) {
        self.release();
    }
}
