//! Cooperative Cancellation
//!
//! A [`CancelSource`] owns the right to cancel; any number of [`CancelToken`]s
//! observe it. Cancellation is one-way and sticky.
//!
//! Tokens also remember the wakers of tasks currently suspended on them, so a
//! cancelled task is resumed on the next scheduler pass instead of sleeping
//! until its original wake-up condition (which may be far in the future for
//! real-time waits). Each suspended future owns a [`Registration`] and hands it
//! back through [`CancelToken::unregister`] once it resolves or is dropped, so
//! a long-lived source only holds wakers of tasks that are still waiting.
//!
//! Everything here is single-threaded (`Rc`/`Cell`): tokens are used by tasks
//! running on the [`FrameScheduler`](crate::FrameScheduler)'s local executor.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::task::Waker;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    struct WakerKey;
}

#[derive(Default)]
struct CancelState {
    cancelled: Cell<bool>,
    wakers: RefCell<SlotMap<WakerKey, Waker>>,
}

impl CancelState {
    fn cancel(&self) -> bool {
        if self.cancelled.replace(true) {
            return false;
        }
        let wakers: SmallVec<[Waker; 4]> = self
            .wakers
            .borrow_mut()
            .drain()
            .map(|(_, waker)| waker)
            .collect();
        for waker in wakers {
            waker.wake();
        }
        true
    }
}

/// A task's waker slot on a [`CancelToken`].
///
/// Kept by a future across polls; empty until the first pending poll.
#[derive(Debug, Default)]
pub struct Registration(Option<WakerKey>);

/// Observer side of a cancellation source. Cheap to clone.
#[derive(Clone)]
pub struct CancelToken {
    state: Rc<CancelState>,
}

impl CancelToken {
    /// A token whose source is unreachable, so it is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self {
            state: Rc::default(),
        }
    }

    /// Checks whether cancellation has been requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Registers `waker` to be woken when the source is cancelled.
    ///
    /// Repeated calls with the same `registration` update its single slot, so
    /// futures may call this on every pending poll. Wakes immediately if the
    /// source is already cancelled.
    pub fn register(&self, waker: &Waker, registration: &mut Registration) {
        if self.is_cancelled() {
            waker.wake_by_ref();
            return;
        }
        let mut wakers = self.state.wakers.borrow_mut();
        if let Some(key) = registration.0
            && let Some(existing) = wakers.get_mut(key)
        {
            if !existing.will_wake(waker) {
                existing.clone_from(waker);
            }
            return;
        }
        registration.0 = Some(wakers.insert(waker.clone()));
    }

    /// Releases the slot taken by [`register`](Self::register). No-op for an
    /// empty registration or one already drained by cancellation.
    pub fn unregister(&self, registration: &mut Registration) {
        if let Some(key) = registration.0.take() {
            self.state.wakers.borrow_mut().remove(key);
        }
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Controller that can trigger cancellation of every token it handed out.
///
/// ```
/// use hourglass_core::CancelSource;
///
/// let source = CancelSource::new();
/// let token = source.token();
/// assert!(!token.is_cancelled());
///
/// source.cancel();
/// assert!(token.is_cancelled());
/// ```
pub struct CancelSource {
    state: Rc<CancelState>,
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::default(),
        }
    }

    /// Creates a token observing this source.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            state: Rc::clone(&self.state),
        }
    }

    /// Cancels every token from this source and wakes their suspended tasks.
    ///
    /// Returns `false` if the source was already cancelled.
    pub fn cancel(&self) -> bool {
        self.state.cancel()
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Number of tasks currently suspended on tokens of this source.
    #[must_use]
    pub fn waiting_tasks(&self) -> usize {
        self.state.wakers.borrow().len()
    }
}

impl fmt::Debug for CancelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelSource")
            .field("cancelled", &self.is_cancelled())
            .field("waiting_tasks", &self.waiting_tasks())
            .finish()
    }
}
