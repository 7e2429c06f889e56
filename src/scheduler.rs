//! Frame scheduling.
//!
//! The session never reads a clock itself. A [`Scheduler`] hands out frame
//! timestamps, either from the wall clock ([`FrameTimer`]) or from a fixed
//! step ([`ManualStepper`]) so whole episodes can be replayed in tests.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

pub trait Scheduler {
    /// Wait for the next frame and return its timestamp in milliseconds.
    /// `None` means the scheduler has run out of frames.
    fn next_tick(&mut self) -> Option<f64>;
}

/// Real-time scheduler pacing frames to a target rate.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    start: Instant,
    frame: Duration,
    next_due: Instant,
}

impl FrameTimer {
    pub fn new(target_fps: u32) -> Self {
        let frame = Duration::from_secs(1) / target_fps.max(1);
        let start = Instant::now();
        Self {
            start,
            frame,
            next_due: start,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }
}

impl Scheduler for FrameTimer {
    fn next_tick(&mut self) -> Option<f64> {
        let now = Instant::now();
        if now < self.next_due {
            std::thread::sleep(self.next_due - now);
        }
        let now = Instant::now();
        // Fell behind (slow draw, suspended terminal): don't try to catch up
        self.next_due = (self.next_due + self.frame).max(now);
        Some(now.duration_since(self.start).as_secs_f64() * 1000.0)
    }
}

/// Deterministic scheduler: timestamps advance by a fixed step.
#[derive(Debug, Clone)]
pub struct ManualStepper {
    now_ms: f64,
    step_ms: f64,
    remaining: Option<u64>,
}

impl ManualStepper {
    /// Unbounded stepper starting at t = 0.
    pub fn new(step_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            step_ms,
            remaining: None,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

impl Scheduler for ManualStepper {
    fn next_tick(&mut self) -> Option<f64> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let now = self.now_ms;
        self.now_ms += self.step_ms;
        Some(now)
    }
}

/// Run `frame` once per scheduled tick until it breaks or the scheduler stops.
///
/// Returns the number of frames run.
pub fn drive<S, F>(scheduler: &mut S, mut frame: F) -> u64
where
    S: Scheduler + ?Sized,
    F: FnMut(f64) -> ControlFlow<()>,
{
    let mut frames = 0;
    while let Some(now_ms) = scheduler.next_tick() {
        frames += 1;
        if frame(now_ms).is_break() {
            break;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_stepper_timestamps() {
        let mut stepper = ManualStepper::new(16.0).with_limit(3);
        assert_eq!(stepper.next_tick(), Some(0.0));
        assert_eq!(stepper.next_tick(), Some(16.0));
        assert_eq!(stepper.next_tick(), Some(32.0));
        assert_eq!(stepper.next_tick(), None);
    }

    #[test]
    fn test_drive_runs_until_limit() {
        let mut stepper = ManualStepper::new(10.0).with_limit(5);
        let mut seen = Vec::new();
        let frames = drive(&mut stepper, |now| {
            seen.push(now);
            ControlFlow::Continue(())
        });
        assert_eq!(frames, 5);
        assert_eq!(seen, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_drive_stops_on_break() {
        let mut stepper = ManualStepper::new(10.0);
        let frames = drive(&mut stepper, |now| {
            if now >= 30.0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(frames, 4);
    }

    #[test]
    fn test_frame_timer_is_monotonic() {
        let mut timer = FrameTimer::new(1000);
        let a = timer.next_tick().unwrap();
        let b = timer.next_tick().unwrap();
        assert!(b >= a);
    }

    #[test]
    fn test_frame_timer_duration() {
        let timer = FrameTimer::new(50);
        assert_eq!(timer.frame_duration(), Duration::from_millis(20));
    }
}
