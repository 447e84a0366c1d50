//! Level catalog and the per-frame orchestrator
//!
//! [`Game`] owns the scene tree and a fixed list of level configurations.
//! Each frame it runs one tick pass, then polls the active level: a win that
//! has lingered long enough advances to the next level (wrapping), a loss
//! replays the same one. Either way the old level subtree is despawned and a
//! fresh instance is built from the immutable config, so consumed boosters
//! and the ball's mass reset.

use glam::Mat4;

use crate::scene::{Camera, DrawBackend, MoveInput, Node, NodeId, NodeKind, SceneTree, TickContext};

use super::grid::{ConfigError, LevelConfig};
use super::level::{self, LevelPhase};

/// The shipped campaign.
///
/// Legend: `.` floor, `o` grow, `^` spike, `G` goal.
pub fn builtin_levels() -> Vec<LevelConfig> {
    vec![
        // A straight corridor of boosters to learn the ropes
        LevelConfig::from_rows(6, (0, 0), &[".oooG"]).expect("builtin level 1"),
        // Weave around the spikes; wasted floor steps cost mass
        LevelConfig::from_rows(2, (0, 0), &[".o..", ".^.o", "o..^", "..oG"])
            .expect("builtin level 2"),
        // Every booster counts
        LevelConfig::from_rows(3, (1, 0), &["o.o", ".^.", "o.G"]).expect("builtin level 3"),
    ]
}

/// Root game object: scene tree, level catalog, camera output
#[derive(Debug)]
pub struct Game {
    tree: SceneTree,
    root: NodeId,
    levels: Vec<LevelConfig>,
    index: usize,
    current: NodeId,
    camera: Camera,
}

impl Game {
    /// Validates every config up front. The list must be non-empty.
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, ConfigError> {
        assert!(!levels.is_empty(), "a game needs at least one level");
        for config in &levels {
            config.validate()?;
        }
        let mut tree = SceneTree::new();
        let root = tree.spawn(Node::new(NodeKind::Group));
        let current = level::spawn(&mut tree, root, &levels[0]);
        Ok(Self {
            tree,
            root,
            levels,
            index: 0,
            current,
            camera: Camera::default(),
        })
    }

    /// One frame of logic: tree tick, then win/loss polling
    pub fn tick(&mut self, dt: f32, input: MoveInput) {
        let mut ctx = TickContext::new(dt, input);
        self.tree.tick(self.root, &mut ctx);
        self.camera = ctx.camera;

        let (phase, done) = {
            let state = level::state(&self.tree, self.current);
            (state.phase(), state.change_done())
        };
        match phase {
            LevelPhase::Win if done => {
                self.index = (self.index + 1) % self.levels.len();
                log::info!("level cleared, advancing to level {}", self.index + 1);
                self.rebuild();
            }
            LevelPhase::Loss if done => {
                log::info!("restarting level {}", self.index + 1);
                self.rebuild();
            }
            _ => {}
        }
    }

    /// Replace the active level with a fresh instance of `levels[index]`
    fn rebuild(&mut self) {
        self.tree.despawn(self.current);
        self.current = level::spawn(&mut self.tree, self.root, &self.levels[self.index]);
    }

    /// World draw pass (apply [`Game::camera`] first)
    pub fn draw_world(&self, out: &mut dyn DrawBackend) {
        self.tree.draw_world(self.root, Mat4::IDENTITY, out);
    }

    /// Screen-space overlay pass
    pub fn draw_overlay(&self, out: &mut dyn DrawBackend) {
        self.tree.draw_overlay(self.root, out);
    }

    /// Camera pose from the last tick
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Zero-based index of the active level
    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn current_level(&self) -> NodeId {
        self.current
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }
}
