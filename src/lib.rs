//! Flappy - a deterministic Flappy Bird simulation core with a terminal frontend.
//!
//! The simulation lives in [`core`] and has no I/O of its own: time comes from
//! a [`scheduler::Scheduler`], input from an [`input::InputQueue`], randomness
//! from an injected `rand::Rng` and the best score from a
//! [`utils::persistence::ScoreStore`].

pub mod build_info;
pub mod config;
pub mod constants;
pub mod core;
pub mod input;
pub mod scheduler;
pub mod ui;
pub mod utils;

pub use config::GameConfig;
pub use core::{Session, SessionEvent, SessionState, Snapshot};
