//! Timer Playground
//!
//! A countdown that restarts itself every two seconds, plus a stopwatch driven
//! by a scripted sequence of key presses:
//!
//! - `Space`: pause / resume the stopwatch
//! - `Shift`: record a lap and print every lap so far
//! - `C`: log a message two seconds later
//!
//! The loop advances a fixed 60 Hz frame, so the output is deterministic.
//!
//! ```text
//! cargo run -p timer_playground
//! cargo run -p timer_playground -- settings.json
//! ```
//!
//! The optional argument is a JSON file with scheduler settings, e.g.
//! `{ "time_scale": 0.5, "max_delta": 0.1 }`.

use std::time::Duration;

use anyhow::Context;
use hourglass::SchedulerSettings;
use hourglass::prelude::*;

const FRAME_RATE: u32 = 60;
const RUN_SECONDS: u32 = 10;

#[derive(Debug, Clone, Copy)]
enum Key {
    Space,
    Shift,
    C,
}

/// Key presses replayed by the frame loop, keyed by unscaled seconds.
const SCRIPT: &[(f32, Key)] = &[
    (1.0, Key::Shift),
    (2.5, Key::Space),
    (3.5, Key::Space),
    (4.0, Key::Shift),
    (5.0, Key::C),
    (6.0, Key::Shift),
    // Still pending at shutdown, so it never fires.
    (9.0, Key::C),
];

struct Playground {
    scheduler: Scheduler,
    countdown: CountdownTimer,
    stopwatch: StopwatchTimer,
    lifetime: CancelSource,
}

impl Playground {
    fn new(scheduler: &Scheduler) -> Self {
        let countdown = CountdownTimer::new(scheduler, 2.0);
        countdown.on_stop(|timer| timer.restart());
        countdown.on_stop(|_| log::info!("2 seconds passed"));
        countdown.start();

        let stopwatch = StopwatchTimer::new(scheduler);
        stopwatch.on_stop(|_| log::info!("Stopped"));
        stopwatch.on_pause(|_| log::info!("Paused"));
        stopwatch.on_resume(|_| log::info!("Resumed"));
        stopwatch.on_lap(|timer| {
            for (i, lap) in timer.laps().iter().enumerate() {
                log::info!("Lap {i} : {lap:.3}");
            }
            log::info!("Total Elapsed : {:.3}", timer.elapsed_time());
        });
        stopwatch.start();

        Self {
            scheduler: scheduler.clone(),
            countdown,
            stopwatch,
            lifetime: CancelSource::new(),
        }
    }

    fn on_key(&self, key: Key) -> anyhow::Result<()> {
        match key {
            Key::Space => self.stopwatch.pause(!self.stopwatch.is_paused()),
            Key::Shift => self.stopwatch.lap(),
            Key::C => one_shot::delay(
                &self.scheduler,
                2.0,
                || log::info!("C Pressed"),
                &self.lifetime.token(),
            )?,
        }
        Ok(())
    }

    fn shutdown(self) {
        self.lifetime.cancel();
        self.stopwatch.cancel();
        self.stopwatch.dispose();
        self.countdown.dispose();
    }
}

fn load_settings() -> anyhow::Result<SchedulerSettings> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SchedulerSettings::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings file {path}"))?;
    SchedulerSettings::from_json_str(&json)
        .with_context(|| format!("Invalid settings in {path}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut frames = FrameScheduler::with_settings(load_settings()?)?;
    log::info!("Scheduler settings: {:?}", frames.settings());
    let playground = Playground::new(&frames.handle());

    let frame = Duration::from_secs(1) / FRAME_RATE;
    let mut script = SCRIPT.iter().peekable();

    for _ in 0..FRAME_RATE * RUN_SECONDS {
        let time = frames.advance(frame);

        while let Some(&(at, key)) =
            script.next_if(|&&(at, _)| f64::from(at) <= time.unscaled_elapsed)
        {
            log::info!("[{at:>5.2}s] {key:?} pressed");
            playground.on_key(key)?;
        }
    }

    log::info!(
        "Done after {} frames, stopwatch at {:.3}s with {} laps",
        frames.handle().frame(),
        playground.stopwatch.elapsed_time(),
        playground.stopwatch.lap_count()
    );
    log::info!(
        "Cancelling {} pending delay(s)",
        playground.lifetime.waiting_tasks()
    );
    playground.shutdown();
    Ok(())
}
