//! Boba Roller - a grid-rolling puzzle game core
//!
//! A ball rolls across a small grid, shrinking on plain floor, growing on
//! consumable booster cells, trying to arrive at the goal cell with enough
//! mass. This crate is the engine-agnostic core:
//!
//! - `timer`: countdown timers with eased progress sampling
//! - `scene`: arena-backed scene tree, tick and draw traversals
//! - `game`: grid rules, tweened player, level state machine, level catalog
//!
//! Windowing, input sampling, model loading and rasterization live in the
//! host. Each frame the host feeds elapsed time and direction-released flags
//! into [`Game::tick`](game::Game::tick), reads back the camera pose, then
//! hands a [`DrawBackend`](scene::DrawBackend) to the two draw passes.

pub mod game;
pub mod scene;
pub mod timer;

pub use game::{Cell, ConfigError, Game, Grid, LevelConfig, LevelPhase, builtin_levels};
pub use scene::{
    Camera, Color, Direction, DrawBackend, ModelId, MoveInput, Node, NodeId, NodeKind, SceneTree,
    TickContext,
};
pub use timer::Timer;

/// Game tuning constants
pub mod consts {
    /// Edge length of one grid cell in world units
    pub const CELL_SIZE: f32 = 1.0;

    /// Duration of one player move animation (seconds)
    pub const MOVE_DURATION: f32 = 0.2;
    /// Visual scale of a size-0 ball
    pub const PLAYER_BASE_SCALE: f32 = 0.4;
    /// Extra visual scale per unit of mass
    pub const PLAYER_SIZE_SCALE: f32 = 0.1;

    /// How long a win/loss lingers before the catalog swaps the level (seconds)
    pub const LEVEL_CHANGE_DELAY: f32 = 1.0;
    /// Downward drift of the ball while the win state lingers (units/second)
    pub const WIN_SINK_SPEED: f32 = 1.5;

    /// Camera offset above the grid center
    pub const CAMERA_HEIGHT: f32 = 10.0;
    /// Camera offset behind the grid center (toward the player's screen)
    pub const CAMERA_BACK: f32 = 6.0;
}
