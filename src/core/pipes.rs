//! Obstacle stream: pipe pairs spawned on the right, scrolled left, culled
//! once they leave the playfield.

use super::geometry::Rect;
use crate::config::{GameConfig, SpawnPolicy};
use rand::Rng;

/// Lower bound on spawn spacing and interval so a bad config cannot make the
/// spawner loop forever.
const MIN_SPAWN_DISTANCE: f64 = 1.0;
const MIN_SPAWN_INTERVAL_MS: f64 = 1.0;

/// A single pipe obstacle (top + bottom segment with a gap between).
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Spawn sequence number, unique within an episode.
    pub id: u64,
    /// Left edge (float for smooth scrolling).
    pub x: f64,
    pub width: f64,
    /// Y of the top of the gap, which is also the top segment's height.
    pub gap_top: f64,
    pub gap_size: f64,
    /// Whether the bird has cleared this pipe.
    pub scored: bool,
}

impl Pipe {
    /// Trailing (right) edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn gap_bottom(&self) -> f64 {
        self.gap_top + self.gap_size
    }

    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.gap_top)
    }

    /// Bottom segment, running from the gap down to the ground line.
    pub fn bottom_rect(&self, ground_y: f64) -> Rect {
        let top = self.gap_bottom();
        Rect::new(self.x, top, self.width, (ground_y - top).max(0.0))
    }
}

#[derive(Debug, Clone)]
pub struct PipeStream {
    pipes: Vec<Pipe>,
    next_id: u64,
    /// Simulated time since the last timed spawn.
    spawn_accum_ms: f64,

    // Cached parameters
    playfield_width: f64,
    ground_y: f64,
    width: f64,
    gap: f64,
    speed: f64,
    policy: SpawnPolicy,
    spawn_distance: f64,
    min_margin: f64,
    cull_margin: f64,
    reference_frame_ms: f64,
}

impl PipeStream {
    pub fn new(config: &GameConfig) -> Self {
        let spawn_distance = config.pipes.spawn_distance.max(MIN_SPAWN_DISTANCE);
        let policy = match config.pipes.spawn_policy {
            SpawnPolicy::Timed { interval_ms } => SpawnPolicy::Timed {
                interval_ms: interval_ms.max(MIN_SPAWN_INTERVAL_MS),
            },
            SpawnPolicy::Distance => SpawnPolicy::Distance,
        };
        if policy != config.pipes.spawn_policy
            || spawn_distance != config.pipes.spawn_distance
        {
            tracing::warn!(
                ?policy,
                spawn_distance,
                "spawn spacing raised to a usable minimum"
            );
        }

        let mut stream = Self {
            pipes: Vec::new(),
            next_id: 0,
            spawn_accum_ms: 0.0,
            playfield_width: config.playfield.width,
            ground_y: config.playfield.ground_y(),
            width: config.pipes.width,
            gap: config.pipes.gap,
            speed: config.pipes.speed,
            policy,
            spawn_distance,
            min_margin: config.pipes.min_margin,
            cull_margin: config.pipes.cull_margin,
            reference_frame_ms: config.clock.reference_frame_ms,
        };
        stream.reset();
        stream
    }

    /// Drop every pipe and re-arm the spawner so the next update spawns.
    pub fn reset(&mut self) {
        self.pipes.clear();
        self.next_id = 0;
        self.spawn_accum_ms = match self.policy {
            SpawnPolicy::Distance => 0.0,
            SpawnPolicy::Timed { interval_ms } => interval_ms,
        };
    }

    /// Active pipes in spawn order, which is also left-to-right order.
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn pipes_mut(&mut self) -> &mut [Pipe] {
        &mut self.pipes
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn ground_y(&self) -> f64 {
        self.ground_y
    }

    /// Mark a pipe as cleared. Returns false if it was already scored or is gone.
    pub fn mark_scored(&mut self, id: u64) -> bool {
        match self.pipes.iter_mut().find(|p| p.id == id) {
            Some(pipe) if !pipe.scored => {
                pipe.scored = true;
                true
            }
            _ => false,
        }
    }

    /// One tick: scroll by `dt` reference frames, cull, then spawn.
    ///
    /// Returns how many pipes were spawned.
    pub fn update<R: Rng>(&mut self, dt: f64, dt_ms: f64, rng: &mut R) -> usize {
        self.advance(dt);
        self.cull();
        self.spawn_due(dt_ms, rng)
    }

    /// Scroll every pipe left.
    pub fn advance(&mut self, dt: f64) {
        let dx = self.speed * dt;
        for pipe in &mut self.pipes {
            pipe.x -= dx;
        }
    }

    /// Remove pipes whose trailing edge is at least `cull_margin` past the left edge.
    pub fn cull(&mut self) -> usize {
        let before = self.pipes.len();
        let limit = -self.cull_margin;
        self.pipes.retain(|p| p.right() > limit);
        before - self.pipes.len()
    }

    fn spawn_due<R: Rng>(&mut self, dt_ms: f64, rng: &mut R) -> usize {
        let mut spawned = 0;
        match self.policy {
            SpawnPolicy::Distance => {
                let threshold = self.playfield_width - self.spawn_distance;
                loop {
                    let x = match self.pipes.last() {
                        None => self.playfield_width,
                        Some(last) if last.x <= threshold => last.x + self.spawn_distance,
                        Some(_) => break,
                    };
                    self.spawn_at(x, rng);
                    spawned += 1;
                }
            }
            SpawnPolicy::Timed { interval_ms } => {
                if dt_ms.is_finite() && dt_ms > 0.0 {
                    self.spawn_accum_ms += dt_ms;
                }
                while self.spawn_accum_ms >= interval_ms {
                    self.spawn_accum_ms -= interval_ms;
                    // Place the pipe where it would be had it spawned exactly on time
                    let overshoot = self.speed * (self.spawn_accum_ms / self.reference_frame_ms);
                    self.spawn_at(self.playfield_width - overshoot, rng);
                    spawned += 1;
                }
            }
        }
        spawned
    }

    fn spawn_at<R: Rng>(&mut self, x: f64, rng: &mut R) {
        let gap_top = self.random_gap_top(rng);
        self.pipes.push(Pipe {
            id: self.next_id,
            x,
            width: self.width,
            gap_top,
            gap_size: self.gap,
            scored: false,
        });
        tracing::trace!(id = self.next_id, x, gap_top, "spawned pipe");
        self.next_id += 1;
    }

    /// Uniform gap offset in `[min_margin, ground_y - gap - min_margin]`,
    /// or the centred gap when that range is empty.
    pub fn random_gap_top<R: Rng>(&self, rng: &mut R) -> f64 {
        let min = self.min_margin;
        let max = self.ground_y - self.gap - self.min_margin;
        if max > min {
            rng.gen_range(min..=max)
        } else {
            ((self.ground_y - self.gap) / 2.0).max(0.0)
        }
    }
}
