//! One-Shot Delays
//!
//! Fire-and-forget helpers that invoke a callback once after a delay. They keep
//! no timer state; cancellation goes through a caller-owned [`CancelToken`].
//!
//! - [`delay`] / [`delay_with_value`] count scaled frame time, so they stall
//!   while the global time scale is zero.
//! - [`delay_realtime`] waits on unscaled time in a single suspension.
//!
//! A cancelled delay never calls its callback. Every helper returns an error
//! only when the scheduler has shut down and the task could not be queued.
//!
//! ```rust,ignore
//! let source = CancelSource::new();
//! one_shot::delay(&scheduler, 2.0, || log::info!("C pressed"), &source.token())?;
//! ```

use hourglass_core::{CancelToken, Result, Scheduler};

/// Calls `callback` once `seconds` of scaled time have elapsed.
///
/// A non-positive delay calls it immediately, before returning.
pub fn delay<F>(scheduler: &Scheduler, seconds: f32, callback: F, token: &CancelToken) -> Result<()>
where
    F: FnOnce() + 'static,
{
    spawn_scaled(scheduler, seconds, token, callback)
}

/// Like [`delay`], but the callback receives the delay that was requested
/// (not the time actually measured, which overshoots by up to one frame).
pub fn delay_with_value<F>(
    scheduler: &Scheduler,
    seconds: f32,
    callback: F,
    token: &CancelToken,
) -> Result<()>
where
    F: FnOnce(f32) + 'static,
{
    spawn_scaled(scheduler, seconds, token, move || callback(seconds))
}

/// Calls `callback` once `seconds` of real (unscaled) time have elapsed.
pub fn delay_realtime<F>(
    scheduler: &Scheduler,
    seconds: f32,
    callback: F,
    token: &CancelToken,
) -> Result<()>
where
    F: FnOnce() + 'static,
{
    // Created here so the deadline is measured from the calling frame.
    let wait = scheduler.wait_realtime(seconds, token);
    scheduler.spawn(async move {
        if wait.await.is_ok() {
            callback();
        }
    })
}

fn spawn_scaled<F>(scheduler: &Scheduler, seconds: f32, token: &CancelToken, callback: F) -> Result<()>
where
    F: FnOnce() + 'static,
{
    // NaN counts as non-positive.
    if !(seconds > 0.0) {
        callback();
        return Ok(());
    }

    let task_scheduler = scheduler.clone();
    let token = token.clone();
    let mut frame = scheduler.frame();
    scheduler.spawn(async move {
        let mut remaining = seconds;
        while remaining > 0.0 {
            let Ok(time) = task_scheduler.next_frame(frame, &token).await else {
                log::trace!("Delay of {seconds}s cancelled");
                return;
            };
            frame = time.frame;
            remaining -= time.delta;
        }
        callback();
    })
}
