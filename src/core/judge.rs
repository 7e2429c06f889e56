//! Collision and scoring judge.
//!
//! A pure query over the bird and the active pipes. It never mutates state:
//! the session applies the verdict (marks pipes scored, ends the episode).

use super::geometry::Rect;
use super::pipes::Pipe;
use crate::config::{CeilingPolicy, JudgeConfig};

/// What the bird hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Ground,
    Ceiling,
    /// A pipe segment; carries the pipe's spawn id.
    Pipe(u64),
}

/// Result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub collision: Option<CollisionKind>,
    /// Ids of unscored pipes whose trailing edge the bird has now cleared.
    pub passed: Vec<u64>,
    /// Points earned by `passed`.
    pub score_delta: u32,
}

impl Verdict {
    pub fn collided(&self) -> bool {
        self.collision.is_some()
    }
}

/// Judge the bird's bounding box against the ground, the ceiling and every pipe.
///
/// Ground and ceiling are checked against the full box and short-circuit the
/// pipe scan. Pipes are checked against the box shrunk by the configured
/// forgiveness; the first colliding pipe in spawn order is reported. Scoring is
/// independent of the collision result.
pub fn evaluate(bird: &Rect, pipes: &[Pipe], ground_y: f64, config: &JudgeConfig) -> Verdict {
    let mut verdict = Verdict::default();

    for pipe in pipes {
        if !pipe.scored && bird.x > pipe.right() {
            verdict.passed.push(pipe.id);
            verdict.score_delta += config.points_per_pipe;
        }
    }

    verdict.collision = bounds_collision(bird, ground_y, config.ceiling).or_else(|| {
        let hitbox = bird.shrink(config.hitbox_forgiveness);
        pipes
            .iter()
            .find(|pipe| {
                hitbox.overlaps(&pipe.top_rect()) || hitbox.overlaps(&pipe.bottom_rect(ground_y))
            })
            .map(|pipe| CollisionKind::Pipe(pipe.id))
    });

    verdict
}

fn bounds_collision(bird: &Rect, ground_y: f64, ceiling: CeilingPolicy) -> Option<CollisionKind> {
    if bird.bottom() >= ground_y {
        return Some(CollisionKind::Ground);
    }
    if ceiling == CeilingPolicy::Fatal && bird.y <= 0.0 {
        return Some(CollisionKind::Ceiling);
    }
    None
}
