//! Grid puzzle rules, tweened player, level state machine, level catalog
//!
//! All gameplay logic lives here. It is pure and frame-stepped: the only
//! inputs are the per-frame delta and direction-released flags, the only
//! outputs are scene-tree mutations, draw calls and the camera pose.

pub mod catalog;
pub mod grid;
pub mod level;
pub mod player;

pub use catalog::{Game, builtin_levels};
pub use grid::{Cell, ConfigError, Grid, LevelConfig};
pub use level::{LevelPhase, LevelState};
pub use player::PlayerState;
