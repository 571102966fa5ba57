//! Stopwatch Timer Tests
//!
//! Tests for:
//! - Counting up until cancelled
//! - Lap recording and lap time reset
//! - Pause, cancel and restart interaction with laps
//! - Realtime stopwatches under a frozen time scale

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use hourglass::prelude::*;

const FRAME: Duration = Duration::from_millis(250);
const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn advance_frames(frames: &mut FrameScheduler, count: usize) {
    for _ in 0..count {
        frames.advance(FRAME);
    }
}

fn counter() -> (Rc<Cell<u32>>, impl Fn(&StopwatchTimer) + 'static) {
    let count = Rc::new(Cell::new(0));
    let handle = Rc::clone(&count);
    (count, move |_: &StopwatchTimer| handle.set(handle.get() + 1))
}

// ============================================================================
// Counting
// ============================================================================

#[test]
fn stopwatch_counts_up_until_cancelled() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    let (ticks, on_tick) = counter();
    let (stops, on_stop) = counter();
    stopwatch.on_tick(on_tick);
    stopwatch.on_stop(on_stop);

    stopwatch.start();
    advance_frames(&mut frames, 40);

    assert!(stopwatch.is_running());
    assert!(approx(stopwatch.elapsed_time(), 10.0));
    assert!(approx(stopwatch.lap_time(), 10.0));
    assert_eq!(ticks.get(), 40);
    assert_eq!(stops.get(), 0);

    stopwatch.cancel();
    stopwatch.cancel();
    assert!(!stopwatch.is_running());
    assert_eq!(stops.get(), 1);

    advance_frames(&mut frames, 4);
    assert!(approx(stopwatch.elapsed_time(), 10.0));
    assert_eq!(ticks.get(), 40);
}

// ============================================================================
// Laps
// ============================================================================

#[test]
fn laps_partition_elapsed_time() {
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    let (laps, on_lap) = counter();
    stopwatch.on_lap(on_lap);
    stopwatch.start();

    advance_frames(&mut frames, 2);
    stopwatch.lap();
    assert_eq!(stopwatch.lap_time(), 0.0);

    advance_frames(&mut frames, 1);
    stopwatch.lap();
    advance_frames(&mut frames, 3);
    stopwatch.lap();

    assert_eq!(stopwatch.laps(), vec![0.5, 0.25, 0.75]);
    assert_eq!(laps.get(), 3);

    let total: f32 = stopwatch.laps().iter().sum();
    assert!(approx(total, stopwatch.elapsed_time()));
}

#[test]
fn lap_without_events_still_records() {
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    let (laps, on_lap) = counter();
    stopwatch.on_lap(on_lap);
    stopwatch.start();

    advance_frames(&mut frames, 1);
    stopwatch.lap_with(false);

    assert_eq!(stopwatch.lap_count(), 1);
    assert_eq!(laps.get(), 0);
}

#[test]
fn lap_listener_sees_recorded_lap() {
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    stopwatch.on_lap(move |timer| {
        log.borrow_mut().push((timer.lap_count(), timer.lap_time()));
    });
    stopwatch.start();
    advance_frames(&mut frames, 2);
    stopwatch.lap();

    assert_eq!(*seen.borrow(), vec![(1, 0.0)]);
}

#[test]
fn restart_keeps_laps_and_resets_lap_time() {
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    stopwatch.start();

    advance_frames(&mut frames, 2);
    stopwatch.lap();
    advance_frames(&mut frames, 1);
    stopwatch.restart();

    assert_eq!(stopwatch.elapsed_time(), 0.0);
    assert_eq!(stopwatch.lap_time(), 0.0);
    assert_eq!(stopwatch.laps(), vec![0.5]);

    advance_frames(&mut frames, 1);
    assert!(approx(stopwatch.elapsed_time(), 0.25));
    assert!(approx(stopwatch.lap_time(), 0.25));
}

// ============================================================================
// Pause / Time Scale
// ============================================================================

#[test]
fn paused_stopwatch_freezes_lap_time() {
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    stopwatch.start();

    advance_frames(&mut frames, 2);
    stopwatch.pause(true);
    advance_frames(&mut frames, 4);
    assert!(approx(stopwatch.lap_time(), 0.5));

    stopwatch.lap();
    assert_eq!(stopwatch.laps(), vec![0.5], "laps may be taken while paused");

    stopwatch.pause(false);
    advance_frames(&mut frames, 1);
    assert!(approx(stopwatch.elapsed_time(), 0.75));
}

#[test]
fn realtime_stopwatch_ignores_frozen_time_scale() {
    let mut frames = FrameScheduler::new();
    let scheduler = frames.handle();
    scheduler.set_time_scale(0.0);

    let scaled = StopwatchTimer::new(&scheduler);
    let realtime = StopwatchTimer::new(&scheduler);
    realtime.set_realtime(true);
    scaled.start();
    realtime.start();

    advance_frames(&mut frames, 4);

    assert_eq!(scaled.elapsed_time(), 0.0);
    assert!(approx(realtime.elapsed_time(), 1.0));
    assert!(approx(realtime.lap_time(), 1.0));
}

#[test]
fn cancel_from_tick_listener_stops_once() {
    let mut frames = FrameScheduler::new();
    let stopwatch = StopwatchTimer::new(&frames.handle());
    let (stops, on_stop) = counter();
    stopwatch.on_tick(|timer| {
        if timer.elapsed_time() >= 0.5 {
            timer.cancel();
        }
    });
    stopwatch.on_stop(on_stop);

    stopwatch.start();
    advance_frames(&mut frames, 5);

    assert!(!stopwatch.is_running());
    assert!(approx(stopwatch.elapsed_time(), 0.5));
    assert_eq!(stops.get(), 1);
}
