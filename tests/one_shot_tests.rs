//! One-Shot Delay Tests
//!
//! Tests for:
//! - Scaled delays firing once after enough frame time
//! - The requested value passed to `delay_with_value`
//! - Cancellation before completion
//! - Realtime delays under a frozen time scale
//! - Immediate firing for non-positive delays

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use hourglass::prelude::*;
use hourglass::HourglassError;

const FRAME: Duration = Duration::from_millis(250);

fn advance_frames(frames: &mut FrameScheduler, count: usize) {
    for _ in 0..count {
        frames.advance(FRAME);
    }
}

fn flag() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
    let fired = Rc::new(Cell::new(0));
    let handle = Rc::clone(&fired);
    (fired, move || handle.set(handle.get() + 1))
}

// ============================================================================
// Scaled Delays
// ============================================================================

#[test]
fn delay_fires_once_after_enough_frames() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    let (fired, callback) = flag();

    one_shot::delay(&scheduler, 1.0, callback, &CancelToken::never()).unwrap();

    advance_frames(&mut frames, 3);
    assert_eq!(fired.get(), 0);

    advance_frames(&mut frames, 1);
    assert_eq!(fired.get(), 1);

    advance_frames(&mut frames, 8);
    assert_eq!(fired.get(), 1);
}

#[test]
fn delay_with_value_passes_requested_seconds() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    let received = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&received);
    one_shot::delay_with_value(
        &scheduler,
        2.0,
        move |seconds| *slot.borrow_mut() = Some(seconds),
        &CancelToken::never(),
    )
    .unwrap();

    // 0.75 * 3 = 2.25: the measured time overshoots the request.
    for _ in 0..2 {
        frames.advance(Duration::from_millis(750));
    }
    assert_eq!(*received.borrow(), None);

    frames.advance(Duration::from_millis(750));
    assert_eq!(*received.borrow(), Some(2.0));
}

#[test]
fn cancelled_delay_never_fires() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    let source = CancelSource::new();
    let (fired, callback) = flag();

    one_shot::delay(&scheduler, 1.0, callback, &source.token()).unwrap();
    advance_frames(&mut frames, 2);
    assert!(source.cancel());

    advance_frames(&mut frames, 8);
    assert_eq!(fired.get(), 0);
}

#[test]
fn delay_cancelled_before_first_frame_never_fires() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    let source = CancelSource::new();
    let (fired, callback) = flag();

    one_shot::delay(&scheduler, 0.25, callback, &source.token()).unwrap();
    source.cancel();
    advance_frames(&mut frames, 2);

    assert_eq!(fired.get(), 0);
}

#[test]
fn non_positive_delay_fires_immediately() {
    let frames = FrameScheduler::new();
    let scheduler = frames.handle();

    let (fired, callback) = flag();
    one_shot::delay(&scheduler, 0.0, callback, &CancelToken::never()).unwrap();
    assert_eq!(fired.get(), 1);

    let (fired, callback) = flag();
    one_shot::delay(&scheduler, -1.0, callback, &CancelToken::never()).unwrap();
    assert_eq!(fired.get(), 1);
}

#[test]
fn scaled_delay_stalls_while_time_is_frozen() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    scheduler.set_time_scale(0.0);
    let (fired, callback) = flag();

    one_shot::delay(&scheduler, 0.5, callback, &CancelToken::never()).unwrap();
    advance_frames(&mut frames, 8);
    assert_eq!(fired.get(), 0);

    scheduler.set_time_scale(1.0);
    advance_frames(&mut frames, 2);
    assert_eq!(fired.get(), 1);
}

// ============================================================================
// Realtime Delays
// ============================================================================

#[test]
fn realtime_delay_ignores_time_scale() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    scheduler.set_time_scale(0.0);
    let (fired, callback) = flag();

    one_shot::delay_realtime(&scheduler, 1.0, callback, &CancelToken::never()).unwrap();

    advance_frames(&mut frames, 3);
    assert_eq!(fired.get(), 0);
    advance_frames(&mut frames, 1);
    assert_eq!(fired.get(), 1);
}

#[test]
fn realtime_deadline_counts_from_calling_frame() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    advance_frames(&mut frames, 4);

    let (fired, callback) = flag();
    one_shot::delay_realtime(&scheduler, 0.5, callback, &CancelToken::never()).unwrap();

    advance_frames(&mut frames, 1);
    assert_eq!(fired.get(), 0);
    advance_frames(&mut frames, 1);
    assert_eq!(fired.get(), 1);
}

#[test]
fn cancelled_realtime_delay_never_fires() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    let source = CancelSource::new();
    let (fired, callback) = flag();

    one_shot::delay_realtime(&scheduler, 1.0, callback, &source.token()).unwrap();
    advance_frames(&mut frames, 1);
    source.cancel();
    advance_frames(&mut frames, 8);

    assert_eq!(fired.get(), 0);
}

#[test]
fn long_lived_source_only_tracks_pending_delays() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    let lifetime = CancelSource::new();
    let fired = Rc::new(Cell::new(0));

    for _ in 0..500 {
        let counter = Rc::clone(&fired);
        one_shot::delay(&scheduler, 0.5, move || counter.set(counter.get() + 1), &lifetime.token())
            .unwrap();
    }
    let (_, pending) = flag();
    one_shot::delay_realtime(&scheduler, 60.0, pending, &lifetime.token()).unwrap();

    advance_frames(&mut frames, 1);
    assert_eq!(lifetime.waiting_tasks(), 501);

    advance_frames(&mut frames, 1);
    assert_eq!(fired.get(), 500);
    assert_eq!(lifetime.waiting_tasks(), 1, "only the realtime delay is still waiting");

    lifetime.cancel();
    advance_frames(&mut frames, 1);
    assert_eq!(lifetime.waiting_tasks(), 0);
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn delay_after_shutdown_reports_error() {
    let frames = FrameScheduler::new();
    let scheduler = frames.handle();
    drop(frames);

    let (fired, callback) = flag();
    let err = one_shot::delay(&scheduler, 1.0, callback, &CancelToken::never()).unwrap_err();

    assert!(matches!(err, HourglassError::SchedulerShutdown(_)));
    assert_eq!(fired.get(), 0);
}
