//! Game configuration.
//!
//! Every tunable lives here so the simulation core never reads globals. The
//! defaults come from [`crate::constants`]; a JSON file can override any subset
//! of fields because every section is `#[serde(default)]`.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Logical drawable area, independent of terminal or pixel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub width: f64,
    pub height: f64,
    /// Height of the ground band at the bottom of the playfield.
    pub ground_height: f64,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            ground_height: GROUND_HEIGHT,
        }
    }
}

impl PlayfieldConfig {
    /// Y coordinate of the top of the ground band.
    pub fn ground_y(&self) -> f64 {
        self.height - self.ground_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    /// Fixed horizontal position (left edge).
    pub x: f64,
    /// Starting vertical position (top edge).
    pub start_y: f64,
    pub width: f64,
    pub height: f64,
    /// Velocity gained per reference frame.
    pub gravity: f64,
    /// Velocity set by a flap (negative = upward).
    pub flap_impulse: f64,
    /// Maximum downward velocity.
    pub terminal_velocity: f64,
    /// Cosmetic rotation range in degrees, symmetric around level flight.
    pub max_rotation_deg: f64,
    /// How long the wing animation runs after a flap.
    pub flap_anim_ms: f64,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            x: BIRD_X,
            start_y: BIRD_START_Y,
            width: BIRD_WIDTH,
            height: BIRD_HEIGHT,
            gravity: GRAVITY,
            flap_impulse: FLAP_IMPULSE,
            terminal_velocity: TERMINAL_VELOCITY,
            max_rotation_deg: MAX_ROTATION_DEG,
            flap_anim_ms: FLAP_ANIM_MS,
        }
    }
}

/// When the obstacle stream creates a new pipe pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SpawnPolicy {
    /// Spawn once the newest pipe is `spawn_distance` units in from the right edge.
    #[default]
    Distance,
    /// Spawn every `interval_ms` of simulated time.
    Timed { interval_ms: f64 },
}

impl SpawnPolicy {
    /// Timed spawning at the stock interval.
    pub fn timed() -> Self {
        SpawnPolicy::Timed {
            interval_ms: PIPE_SPAWN_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    pub width: f64,
    /// Vertical size of the opening between the top and bottom segment.
    pub gap: f64,
    /// Leftward speed per reference frame.
    pub speed: f64,
    pub spawn_policy: SpawnPolicy,
    /// Horizontal spacing used by [`SpawnPolicy::Distance`].
    pub spawn_distance: f64,
    /// Minimum height of either pipe segment.
    pub min_margin: f64,
    /// How far past the left edge a pipe travels before it is dropped.
    pub cull_margin: f64,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            width: PIPE_WIDTH,
            gap: PIPE_GAP,
            speed: PIPE_SPEED,
            spawn_policy: SpawnPolicy::Distance,
            spawn_distance: PIPE_SPAWN_DISTANCE,
            min_margin: PIPE_MIN_MARGIN,
            cull_margin: PIPE_CULL_MARGIN,
        }
    }
}

/// What touching the top of the playfield does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingPolicy {
    /// Position is clamped and upward velocity cancelled. Not a death.
    #[default]
    Clamp,
    /// Touching the ceiling ends the episode.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Fraction (0..1) the bird box is shrunk by for pipe tests.
    pub hitbox_forgiveness: f64,
    pub points_per_pipe: u32,
    pub ceiling: CeilingPolicy,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            hitbox_forgiveness: HITBOX_FORGIVENESS,
            points_per_pipe: POINTS_PER_PIPE,
            ceiling: CeilingPolicy::Clamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Frame duration that physics constants are expressed against.
    pub reference_frame_ms: f64,
    /// Upper bound on a single tick's delta.
    pub max_delta_ms: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            reference_frame_ms: REFERENCE_FRAME_MS,
            max_delta_ms: MAX_DELTA_MS,
        }
    }
}

/// Full configuration for one game process.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub playfield: PlayfieldConfig,
    pub bird: BirdConfig,
    pub pipes: PipeConfig,
    pub judge: JudgeConfig,
    pub clock: ClockConfig,
}

/// Reasons a configuration cannot be played.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A size, speed or duration that must be a positive finite number is not.
    NotPositive { field: &'static str, value: f64 },
    /// A value that must be finite and non-negative is not.
    Negative { field: &'static str, value: f64 },
    NotFinite { field: &'static str, value: f64 },
    /// The pipe gap does not fit between the ceiling and the ground.
    GapTooLarge { gap: f64, playable_height: f64 },
    /// Forgiveness must shrink the hitbox without making it vanish.
    ForgivenessOutOfRange { value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{field} must be a positive number, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::NotFinite { field, value } => write!(f, "{field} must be finite, got {value}"),
            Self::GapTooLarge {
                gap,
                playable_height,
            } => write!(
                f,
                "pipe gap {gap} does not fit in playable height {playable_height}"
            ),
            Self::ForgivenessOutOfRange { value } => {
                write!(f, "hitbox_forgiveness must be in [0, 1), got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

impl GameConfig {
    /// Check that the configuration describes a playable game.
    ///
    /// Margins that are merely too large are not an error: the obstacle stream
    /// centres the gap when the margin range is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.playfield;
        positive("playfield.width", p.width)?;
        positive("playfield.height", p.height)?;
        non_negative("playfield.ground_height", p.ground_height)?;

        let b = &self.bird;
        positive("bird.width", b.width)?;
        positive("bird.height", b.height)?;
        non_negative("bird.gravity", b.gravity)?;
        positive("bird.terminal_velocity", b.terminal_velocity)?;
        non_negative("bird.max_rotation_deg", b.max_rotation_deg)?;
        non_negative("bird.flap_anim_ms", b.flap_anim_ms)?;
        if !b.flap_impulse.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "bird.flap_impulse",
                value: b.flap_impulse,
            });
        }

        let pipes = &self.pipes;
        positive("pipes.width", pipes.width)?;
        positive("pipes.gap", pipes.gap)?;
        positive("pipes.speed", pipes.speed)?;
        non_negative("pipes.min_margin", pipes.min_margin)?;
        non_negative("pipes.cull_margin", pipes.cull_margin)?;
        match pipes.spawn_policy {
            SpawnPolicy::Distance => positive("pipes.spawn_distance", pipes.spawn_distance)?,
            SpawnPolicy::Timed { interval_ms } => {
                positive("pipes.spawn_policy.interval_ms", interval_ms)?
            }
        }

        let playable_height = p.ground_y();
        if pipes.gap >= playable_height {
            return Err(ConfigError::GapTooLarge {
                gap: pipes.gap,
                playable_height,
            });
        }

        let forgiveness = self.judge.hitbox_forgiveness;
        if !(0.0..1.0).contains(&forgiveness) {
            return Err(ConfigError::ForgivenessOutOfRange { value: forgiveness });
        }

        positive("clock.reference_frame_ms", self.clock.reference_frame_ms)?;
        non_negative("clock.max_delta_ms", self.clock.max_delta_ms)?;
        Ok(())
    }

    /// Load a configuration file, falling back to defaults.
    ///
    /// A missing file is the normal case and is silent. A file that cannot be
    /// read, parsed or validated is reported and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    fn load(path: &Path) -> io::Result<Option<Self>> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(config))
    }
}
