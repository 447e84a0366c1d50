//! Level actor: grid ownership, input resolution, win/lose state machine
//!
//! A level instance owns the working grid, the player node, the goal-cup
//! prop and a size readout label. Input is resolved only while the phase is
//! `Play` and the player's move tween has landed; win and loss freeze the
//! puzzle and run the level-change timer the catalog polls.

use glam::{Mat4, Vec2, Vec3};

use crate::consts::{CAMERA_BACK, CAMERA_HEIGHT, CELL_SIZE, LEVEL_CHANGE_DELAY, WIN_SINK_SPEED};
use crate::scene::{
    Camera, Color, Direction, DrawBackend, ModelId, Node, NodeId, NodeKind, PropModel, SceneTree,
    TextLabel, TickContext, Transform,
};
use crate::timer::Timer;

use super::grid::{self, Cell, Grid, LevelConfig};
use super::player::PlayerState;

/// Host-side model slot for the goal cup prop
pub const GOAL_CUP_MODEL: ModelId = ModelId(1);

const FLOOR_COLOR: Color = Color::rgb(236, 227, 212);
const GROW_COLOR: Color = Color::rgb(121, 72, 43);
const SPIKE_COLOR: Color = Color::rgb(186, 60, 48);
const GOAL_COLOR: Color = Color::rgb(244, 180, 64);
const LABEL_COLOR: Color = Color::BLACK;

/// Puzzle phase of a level instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// Accepting moves
    Play,
    /// Goal reached with enough mass; lingers while the change timer runs
    Win,
    /// Wrong mass on the goal, or the puzzle became unwinnable
    Loss,
}

/// Scene-tree state of one playable level
#[derive(Debug)]
pub struct LevelState {
    config: LevelConfig,
    grid: Grid,
    phase: LevelPhase,
    /// Runs only while the phase is Win or Loss
    change_timer: Timer,
    player: NodeId,
    label: NodeId,
    goal_prop: Option<NodeId>,
}

impl LevelState {
    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    /// True once a win or loss has lingered long enough for the catalog to
    /// swap the level
    pub fn change_done(&self) -> bool {
        self.phase != LevelPhase::Play && self.change_timer.is_complete()
    }

    pub fn player(&self) -> NodeId {
        self.player
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    fn enter(&mut self, phase: LevelPhase) {
        log::info!("level phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.change_timer.restart(LEVEL_CHANGE_DELAY);
    }
}

/// Build a fresh level subtree under `parent` from its immutable config.
/// The caller has validated the config; see [`LevelConfig::validate`].
pub fn spawn(tree: &mut SceneTree, parent: NodeId, config: &LevelConfig) -> NodeId {
    let grid = Grid::new(config);

    let player = tree.spawn(Node::with_transform(
        NodeKind::Player(PlayerState::new(config.start, 0)),
        Transform {
            position: grid::cell_to_world(config.start),
            scale: Vec3::splat(PlayerState::scale_for(0.0)),
            ..Transform::default()
        },
    ));

    let goal_prop = grid.goal_cell().map(|cell| {
        tree.spawn(Node::with_transform(
            NodeKind::Prop(PropModel {
                model: GOAL_CUP_MODEL,
                tint: Color::WHITE,
            }),
            Transform {
                position: grid::cell_to_world(cell),
                ..Transform::default()
            },
        ))
    });

    let label = tree.spawn(Node::with_transform(
        NodeKind::Label(TextLabel {
            text: String::new(),
            font_size: 24.0,
            color: LABEL_COLOR,
        }),
        Transform {
            position: Vec3::new(16.0, 16.0, 0.0),
            ..Transform::default()
        },
    ));

    let state = LevelState {
        config: config.clone(),
        grid,
        phase: LevelPhase::Play,
        change_timer: Timer::new(LEVEL_CHANGE_DELAY),
        player,
        label,
        goal_prop,
    };
    let id = tree.spawn(Node::new(NodeKind::Level(Box::new(state))));
    tree.add_child(parent, id);
    tree.add_child(id, player);
    if let Some(prop) = goal_prop {
        tree.add_child(id, prop);
    }
    tree.add_child(id, label);

    log::info!(
        "spawned {}x{} level, goal size {}",
        config.width,
        config.height,
        config.goal_size
    );
    id
}

/// The level state of a spawned level node
pub fn state(tree: &SceneTree, id: NodeId) -> &LevelState {
    let NodeKind::Level(state) = &tree.node(id).kind else {
        panic!("{id:?} is not a level node");
    };
    state
}

pub(crate) fn tick(tree: &mut SceneTree, id: NodeId, ctx: &mut TickContext) {
    // Camera rides a fixed offset above and behind the grid center; the host
    // applies it before the world pass.
    {
        let node = tree.node(id);
        let NodeKind::Level(state) = &node.kind else {
            unreachable!("level tick on non-level node");
        };
        let target = node.transform.position + state.grid.center();
        ctx.camera = Camera {
            target,
            position: target + Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_BACK),
        };
    }

    let (phase, player_id, label_id, goal_prop) = {
        let state = state(tree, id);
        (state.phase, state.player, state.label, state.goal_prop)
    };

    match phase {
        LevelPhase::Play => resolve_input(tree, id, player_id, ctx),
        LevelPhase::Win => {
            {
                let NodeKind::Level(state) = &mut tree.node_mut(id).kind else {
                    unreachable!();
                };
                state.change_timer.update(ctx.dt);
            }
            // Sinking cue: the ball settles into the cup while the win lingers
            tree.node_mut(player_id).transform.position.y -= WIN_SINK_SPEED * ctx.dt;
            if let Some(prop) = goal_prop {
                tree.node_mut(prop).transform.rotation.y += 4.0 * ctx.dt;
            }
        }
        LevelPhase::Loss => {
            let NodeKind::Level(state) = &mut tree.node_mut(id).kind else {
                unreachable!();
            };
            state.change_timer.update(ctx.dt);
        }
    }

    refresh_label(tree, id, player_id, label_id);
}

/// Resolve at most one directional input into a move. Directions are checked
/// in a fixed order and the first accepted move wins; everything else this
/// frame is dropped, never queued.
fn resolve_input(tree: &mut SceneTree, id: NodeId, player_id: NodeId, ctx: &TickContext) {
    let (lnode, pnode) = tree.get2_mut(id, player_id);
    let NodeKind::Level(state) = &mut lnode.kind else {
        unreachable!("level tick on non-level node");
    };
    let NodeKind::Player(player) = &mut pnode.kind else {
        unreachable!("level player handle is not a player node");
    };

    if !player.can_move() {
        return;
    }

    for dir in Direction::ALL {
        if !ctx.input.released(dir) {
            continue;
        }
        let from = player.cell();
        let (dx, dy) = dir.step();
        let target = state.grid.clamp_cell((from.0 + dx, from.1 + dy));
        if target == from {
            // Clamped at an edge: no move
            continue;
        }

        let cell = state.grid.get(target);
        if !cell.is_enterable() {
            // Blocked outright: no movement, no state change
            continue;
        }
        match cell {
            Cell::Spike => unreachable!("spike cells are not enterable"),
            Cell::Floor => {
                let new_size = player.size().saturating_sub(1);
                player.begin_move(pnode.transform.position, target, new_size);
                log::debug!("rolled onto {target:?}, size {new_size}");
            }
            Cell::Grow => {
                state.grid.consume_grow(target);
                let new_size = player.size() + 2;
                player.begin_move(pnode.transform.position, target, new_size);
                log::debug!("ate a booster at {target:?}, size {new_size}");
            }
            Cell::Goal => {
                let arriving = player.size();
                player.begin_move(pnode.transform.position, target, arriving);
                if arriving >= state.config.goal_size {
                    state.enter(LevelPhase::Win);
                } else {
                    state.enter(LevelPhase::Loss);
                }
                return;
            }
        }

        // A non-goal move resolved. If no boosters are left and the mass
        // still cannot clear the goal, the puzzle is unwinnable.
        if state.grid.grow_cells_remaining() == 0 && player.size() < state.config.goal_size {
            log::info!(
                "unwinnable: no boosters left at size {} (goal {})",
                player.size(),
                state.config.goal_size
            );
            state.enter(LevelPhase::Loss);
        }
        return;
    }
}

fn refresh_label(tree: &mut SceneTree, id: NodeId, player_id: NodeId, label_id: NodeId) {
    let (phase, goal) = {
        let state = state(tree, id);
        (state.phase, state.config.goal_size)
    };
    let size = {
        let NodeKind::Player(player) = &tree.node(player_id).kind else {
            unreachable!();
        };
        player.size()
    };
    let text = match phase {
        LevelPhase::Play => format!("Size {size} / {goal}"),
        LevelPhase::Win => "Clear!".to_string(),
        LevelPhase::Loss => "Try again".to_string(),
    };
    let NodeKind::Label(label) = &mut tree.node_mut(label_id).kind else {
        unreachable!("level label handle is not a label node");
    };
    if label.text != text {
        label.text = text;
    }
}

/// Grid cells as colored planes with circle markers for the special cells
pub(crate) fn draw_world(state: &LevelState, world: Mat4, out: &mut dyn DrawBackend) {
    let grid = &state.grid;
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let tile = world * Mat4::from_translation(grid::cell_to_world((x, y)));
            out.draw_plane(tile, Vec2::splat(CELL_SIZE * 0.96), FLOOR_COLOR);
            let marker = match grid.get((x, y)) {
                Cell::Floor => None,
                Cell::Grow => Some((GROW_COLOR, 0.22)),
                Cell::Spike => Some((SPIKE_COLOR, 0.38)),
                Cell::Goal => Some((GOAL_COLOR, 0.45)),
            };
            if let Some((color, radius)) = marker {
                // Lifted a hair off the floor to avoid z-fighting
                let lifted = tile * Mat4::from_translation(Vec3::Y * 0.01);
                out.draw_circle(lifted, radius, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MoveInput;

    fn setup(goal: u32, start: (i32, i32), rows: &[&str]) -> (SceneTree, NodeId) {
        let config = LevelConfig::from_rows(goal, start, rows).unwrap();
        let mut tree = SceneTree::new();
        let root = tree.spawn(Node::new(NodeKind::Group));
        let id = spawn(&mut tree, root, &config);
        (tree, id)
    }

    fn player_state(tree: &SceneTree, id: NodeId) -> &PlayerState {
        let NodeKind::Player(player) = &tree.node(state(tree, id).player()).kind else {
            unreachable!()
        };
        player
    }

    /// One frame with `input`, then enough idle frames to land the tween
    fn step(tree: &mut SceneTree, id: NodeId, input: MoveInput) {
        let mut ctx = TickContext::new(0.016, input);
        tree.tick(id, &mut ctx);
        for _ in 0..6 {
            let mut ctx = TickContext::new(0.05, MoveInput::default());
            tree.tick(id, &mut ctx);
        }
    }

    fn right() -> MoveInput {
        MoveInput {
            right: true,
            ..MoveInput::default()
        }
    }

    #[test]
    fn test_grow_cell_feeds_and_is_consumed() {
        let (mut tree, id) = setup(2, (0, 0), &[".o.G"]);
        step(&mut tree, id, right());

        let player = player_state(&tree, id);
        assert_eq!(player.size(), 2);
        assert_eq!(player.cell(), (1, 0));
        assert_eq!(state(&tree, id).grid().get((1, 0)), Cell::Floor);
        assert_eq!(state(&tree, id).grid().grow_cells_remaining(), 0);
        assert_eq!(state(&tree, id).phase(), LevelPhase::Play);
    }

    #[test]
    fn test_floor_grinds_mass_floored_at_zero() {
        let (mut tree, id) = setup(0, (0, 0), &["..G"]);
        step(&mut tree, id, right());
        assert_eq!(player_state(&tree, id).size(), 0);
        assert_eq!(player_state(&tree, id).cell(), (1, 0));
    }

    #[test]
    fn test_spike_blocks_entry_entirely() {
        let (mut tree, id) = setup(0, (0, 0), &[".^G"]);
        let mut ctx = TickContext::new(0.016, right());
        tree.tick(id, &mut ctx);

        let player = player_state(&tree, id);
        assert_eq!(player.cell(), (0, 0));
        assert_eq!(player.size(), 0);
        // No animation started either
        assert!(player.can_move());
        assert_eq!(state(&tree, id).phase(), LevelPhase::Play);
    }

    #[test]
    fn test_edge_clamp_is_not_a_move() {
        let (mut tree, id) = setup(0, (0, 0), &[".G"]);
        let input = MoveInput {
            left: true,
            up: true,
            down: true,
            ..MoveInput::default()
        };
        let mut ctx = TickContext::new(0.016, input);
        tree.tick(id, &mut ctx);
        let player = player_state(&tree, id);
        assert_eq!(player.cell(), (0, 0));
        assert!(player.can_move());
    }

    #[test]
    fn test_input_dropped_while_move_in_flight() {
        let (mut tree, id) = setup(9, (0, 0), &["...G"]);
        let mut ctx = TickContext::new(0.016, right());
        tree.tick(id, &mut ctx);
        // Mid-animation press: dropped, not queued
        let mut ctx = TickContext::new(0.016, right());
        tree.tick(id, &mut ctx);
        for _ in 0..10 {
            let mut ctx = TickContext::new(0.05, MoveInput::default());
            tree.tick(id, &mut ctx);
        }
        assert_eq!(player_state(&tree, id).cell(), (1, 0));
    }

    #[test]
    fn test_corridor_scenario_wins_at_size_six() {
        let (mut tree, id) = setup(6, (0, 0), &[".oooG"]);
        // Size after each landed move, starting from the spawn size. The
        // first right already lands on a booster, so the chain jumps to 2
        // immediately; every effect applies on entering the target cell.
        let mut sizes = vec![player_state(&tree, id).size()];
        for _ in 0..4 {
            assert!(player_state(&tree, id).can_move());
            step(&mut tree, id, right());
            sizes.push(player_state(&tree, id).size());
        }
        assert_eq!(sizes, vec![0, 2, 4, 6, 6]);
        assert_eq!(player_state(&tree, id).cell(), (4, 0));
        assert_eq!(state(&tree, id).phase(), LevelPhase::Win);
    }

    #[test]
    fn test_goal_with_insufficient_mass_is_a_loss() {
        let (mut tree, id) = setup(3, (0, 0), &[".G"]);
        step(&mut tree, id, right());
        assert_eq!(state(&tree, id).phase(), LevelPhase::Loss);
    }

    #[test]
    fn test_no_boosters_left_forces_loss() {
        let (mut tree, id) = setup(5, (0, 0), &["..G"]);
        // A perfectly ordinary floor move, but the puzzle is now unwinnable
        step(&mut tree, id, right());
        assert_eq!(state(&tree, id).phase(), LevelPhase::Loss);
    }

    #[test]
    fn test_win_freezes_input_and_sinks_player() {
        let (mut tree, id) = setup(0, (0, 0), &[".G"]);
        step(&mut tree, id, right());
        assert_eq!(state(&tree, id).phase(), LevelPhase::Win);

        let y_before = tree.node(state(&tree, id).player()).transform.position.y;
        step(&mut tree, id, right());
        let player = player_state(&tree, id);
        // Frozen puzzle: the extra press changed nothing
        assert_eq!(player.cell(), (1, 0));
        let y_after = tree.node(state(&tree, id).player()).transform.position.y;
        assert!(y_after < y_before, "{y_after} !< {y_before}");
    }

    #[test]
    fn test_goal_roll_finishes_before_the_sink() {
        let (mut tree, id) = setup(0, (0, 0), &[".G"]);
        let mut ctx = TickContext::new(0.016, right());
        tree.tick(id, &mut ctx);
        assert_eq!(state(&tree, id).phase(), LevelPhase::Win);

        // While the goal move is in flight the tween owns the transform, so
        // the sink cue cannot drag the ball down mid-roll.
        for _ in 0..4 {
            let mut ctx = TickContext::new(0.05, MoveInput::default());
            tree.tick(id, &mut ctx);
        }
        let landed = tree.node(state(&tree, id).player()).transform.position;
        assert_eq!(landed, grid::cell_to_world((1, 0)));

        // Only now does the sink start accumulating
        let mut ctx = TickContext::new(0.05, MoveInput::default());
        tree.tick(id, &mut ctx);
        let sunk = tree.node(state(&tree, id).player()).transform.position;
        assert!(sunk.y < landed.y);
        assert_eq!((sunk.x, sunk.z), (landed.x, landed.z));
    }

    #[test]
    fn test_change_timer_gates_the_linger() {
        let (mut tree, id) = setup(0, (0, 0), &[".G"]);
        step(&mut tree, id, right());
        assert!(!state(&tree, id).change_done());
        for _ in 0..24 {
            let mut ctx = TickContext::new(0.05, MoveInput::default());
            tree.tick(id, &mut ctx);
        }
        assert!(state(&tree, id).change_done());
    }

    #[test]
    fn test_camera_tracks_grid_center() {
        let (mut tree, id) = setup(0, (0, 0), &["..", "..", ".G"]);
        let mut ctx = TickContext::new(0.016, MoveInput::default());
        tree.tick(id, &mut ctx);
        let target = Vec3::new(0.5 * CELL_SIZE, 0.0, 1.0 * CELL_SIZE);
        assert_eq!(ctx.camera.target, target);
        assert_eq!(
            ctx.camera.position,
            target + Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_BACK)
        );
    }

    #[test]
    fn test_draw_world_emits_a_plane_per_cell() {
        use crate::scene::{DrawCall, RecordingBackend};
        let (tree, id) = setup(2, (0, 0), &[".o", "^G"]);
        let mut out = RecordingBackend::new();
        tree.draw_world(id, Mat4::IDENTITY, &mut out);
        let planes = out
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Plane { .. }))
            .count();
        let circles = out
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Circle { .. }))
            .count();
        let models = out
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Model { .. }))
            .count();
        let spheres = out
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Sphere { .. }))
            .count();
        assert_eq!(planes, 4);
        // Grow, spike and goal markers
        assert_eq!(circles, 3);
        // Goal cup prop
        assert_eq!(models, 1);
        // The ball
        assert_eq!(spheres, 1);
    }
}
