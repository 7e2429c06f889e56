// Playfield
pub const PLAYFIELD_WIDTH: f64 = 400.0;
pub const PLAYFIELD_HEIGHT: f64 = 600.0;
pub const GROUND_HEIGHT: f64 = 112.0;

// Timing
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0; // 16.67ms per frame
pub const MAX_DELTA_MS: f64 = 50.0;
pub const TARGET_FPS: u32 = 60;

// Bird physics (units are per reference frame)
pub const BIRD_X: f64 = 100.0;
pub const BIRD_START_Y: f64 = 300.0;
pub const BIRD_WIDTH: f64 = 34.0;
pub const BIRD_HEIGHT: f64 = 24.0;
pub const GRAVITY: f64 = 0.5;
pub const FLAP_IMPULSE: f64 = -8.0;
pub const TERMINAL_VELOCITY: f64 = 8.0;
pub const MAX_ROTATION_DEG: f64 = 90.0;
pub const FLAP_ANIM_MS: f64 = 200.0;

// Pipes
pub const PIPE_WIDTH: f64 = 52.0;
pub const PIPE_GAP: f64 = 120.0;
pub const PIPE_SPEED: f64 = 2.0;
pub const PIPE_SPAWN_DISTANCE: f64 = 200.0;
pub const PIPE_SPAWN_INTERVAL_MS: f64 = 1600.0;
pub const PIPE_MIN_MARGIN: f64 = 50.0;
pub const PIPE_CULL_MARGIN: f64 = 5.0;

// Judge
pub const HITBOX_FORGIVENESS: f64 = 0.2;
pub const POINTS_PER_PIPE: u32 = 1;

// Persistence
pub const HIGH_SCORE_KEY: &str = "flappybird_highscore";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "flappy.log";
pub const LOG_ENV_VAR: &str = "FLAPPY_LOG";
