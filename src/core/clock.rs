//! Frame clock.
//!
//! Turns the timestamps handed in by the scheduler into clamped per-tick
//! deltas. A long stall (suspended terminal, debugger, slow frame) is capped at
//! `max_delta_ms` so the bird cannot tunnel through the ground in one step.

use crate::config::ClockConfig;

#[derive(Debug, Clone)]
pub struct Clock {
    last: Option<f64>,
    max_delta_ms: f64,
    reference_frame_ms: f64,
}

impl Clock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            last: None,
            max_delta_ms: config.max_delta_ms,
            reference_frame_ms: config.reference_frame_ms,
        }
    }

    /// Elapsed milliseconds since the previous call, clamped to `[0, max_delta_ms]`.
    ///
    /// The first call after construction only seeds the reference point and
    /// returns 0. Timestamps that run backwards or are not
    /// finite also yield 0.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let previous = self.last;
        if now_ms.is_finite() {
            self.last = Some(now_ms);
        }
        let Some(previous) = previous else {
            return 0.0;
        };

        let raw = now_ms - previous;
        if !raw.is_finite() || raw <= 0.0 {
            return 0.0;
        }
        if raw > self.max_delta_ms {
            tracing::debug!(
                raw_ms = raw,
                max_ms = self.max_delta_ms,
                "clamping frame delta"
            );
            return self.max_delta_ms;
        }
        raw
    }

    /// Seed the reference point without producing a delta.
    pub fn restart_at(&mut self, now_ms: f64) {
        self.last = now_ms.is_finite().then_some(now_ms);
    }

    /// Delta expressed in reference frames (1.0 = one 60 Hz frame by default).
    pub fn normalize(&self, delta_ms: f64) -> f64 {
        delta_ms / self.reference_frame_ms
    }

    pub fn reference_frame_ms(&self) -> f64 {
        self.reference_frame_ms
    }
}
