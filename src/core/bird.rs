//! The bird: one body with a single vertical degree of freedom.

use super::geometry::Rect;
use crate::config::BirdConfig;

#[derive(Debug, Clone)]
pub struct Bird {
    /// Fixed horizontal position (left edge).
    pub x: f64,
    /// Vertical position of the top edge. 0 = ceiling, grows downward.
    pub y: f64,
    /// Vertical velocity in units per reference frame (positive = downward).
    pub velocity: f64,
    /// Cosmetic tilt in degrees, derived from velocity.
    pub rotation: f64,
    pub alive: bool,
    /// Milliseconds left on the wing animation.
    pub flap_timer_ms: f64,
    pub width: f64,
    pub height: f64,

    // Cached physics parameters
    gravity: f64,
    flap_impulse: f64,
    terminal_velocity: f64,
    max_rotation_deg: f64,
    flap_anim_ms: f64,
}

impl Bird {
    pub fn new(config: &BirdConfig) -> Self {
        Self {
            x: config.x,
            y: config.start_y,
            velocity: 0.0,
            rotation: 0.0,
            alive: true,
            flap_timer_ms: 0.0,
            width: config.width,
            height: config.height,
            gravity: config.gravity,
            flap_impulse: config.flap_impulse,
            terminal_velocity: config.terminal_velocity,
            max_rotation_deg: config.max_rotation_deg,
            flap_anim_ms: config.flap_anim_ms,
        }
    }

    /// Advance by `dt` reference frames (`dt_ms` drives the cosmetic timers).
    ///
    /// The top of the playfield is a hard stop: position clamps to 0 and
    /// velocity is zeroed. The ground is not handled here; the judge treats
    /// reaching it as a collision.
    pub fn update(&mut self, dt: f64, dt_ms: f64) {
        if !self.alive || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.velocity += self.gravity * dt;
        self.velocity = self.velocity.min(self.terminal_velocity);
        self.y += self.velocity * dt;

        if self.y < 0.0 {
            self.y = 0.0;
            self.velocity = 0.0;
        }

        self.rotation = self.rotation_for(self.velocity);
        self.flap_timer_ms = (self.flap_timer_ms - dt_ms).max(0.0);
    }

    /// Overwrite velocity with the upward impulse. Impulses never stack.
    ///
    /// Returns whether the flap happened (dead birds do not flap).
    pub fn flap(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.velocity = self.flap_impulse;
        self.rotation = self.rotation_for(self.velocity);
        self.flap_timer_ms = self.flap_anim_ms;
        true
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.flap_timer_ms = 0.0;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_flapping(&self) -> bool {
        self.flap_timer_ms > 0.0
    }

    fn rotation_for(&self, velocity: f64) -> f64 {
        let t = (velocity / self.terminal_velocity).clamp(-1.0, 1.0);
        t * self.max_rotation_deg
    }
}
