//! Terminal frontend: draws session snapshots with ratatui.

pub mod game_common;
pub mod play_scene;

pub use play_scene::render_game;
