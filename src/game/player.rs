//! The rolling ball: discrete puzzle state plus tweened presentation
//!
//! The puzzle only ever sees the discrete `size` and `cell`; the eased
//! position and scale exist for the eye. A move latches start/end poses and
//! rearms the move timer; while the timer runs, further moves are refused.

use glam::{Mat4, Vec3};

use crate::consts::{MOVE_DURATION, PLAYER_BASE_SCALE, PLAYER_SIZE_SCALE};
use crate::scene::{Color, DrawBackend, NodeId, NodeKind, SceneTree, TickContext};
use crate::timer::Timer;

use super::grid;

const BALL_COLOR: Color = Color::BLACK;

/// Discrete puzzle state and animated presentation of the ball
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Logical mass; the visual scale derives from this
    size: u32,
    /// Discrete grid cell (column, row)
    cell: (i32, i32),
    move_timer: Timer,
    move_start: Vec3,
    move_end: Vec3,
    /// Mass before the in-flight move, for the scale tween
    start_size: u32,
}

impl PlayerState {
    pub fn new(cell: (i32, i32), size: u32) -> Self {
        let position = grid::cell_to_world(cell);
        Self {
            size,
            cell,
            move_timer: Timer::expired(),
            move_start: position,
            move_end: position,
            start_size: size,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cell(&self) -> (i32, i32) {
        self.cell
    }

    /// True exactly when no move animation is in flight
    pub fn can_move(&self) -> bool {
        self.move_timer.is_complete()
    }

    /// Visual scale for a given mass
    pub fn scale_for(size: f32) -> f32 {
        PLAYER_BASE_SCALE + size * PLAYER_SIZE_SCALE
    }

    /// Latch an animated move to `target_cell` and commit the new logical
    /// mass. `current_position` is the presentation position the tween starts
    /// from. Caller must have checked [`Self::can_move`].
    pub(crate) fn begin_move(
        &mut self,
        current_position: Vec3,
        target_cell: (i32, i32),
        new_size: u32,
    ) {
        debug_assert!(self.can_move(), "move issued while one is in flight");
        self.move_start = current_position;
        self.move_end = grid::cell_to_world(target_cell);
        self.start_size = self.size;
        self.size = new_size;
        self.cell = target_cell;
        self.move_timer.restart(MOVE_DURATION);
    }
}

/// Advance the move tween and refresh the node's presentation transform.
///
/// The tween writes the transform only until it lands (the final sample is
/// exactly the target pose); after that the transform is left alone so the
/// level can nudge it, e.g. the sinking cue while a win lingers.
pub(crate) fn tick(tree: &mut SceneTree, id: NodeId, ctx: &mut TickContext) {
    let node = tree.node_mut(id);
    let NodeKind::Player(player) = &mut node.kind else {
        unreachable!("player tick on non-player node");
    };

    let landed = player.move_timer.is_complete();
    player.move_timer.update(ctx.dt);
    if landed {
        return;
    }

    let position = player
        .move_start
        .lerp(player.move_end, player.move_timer.progress_out_back());
    let size = lerp(
        player.start_size as f32,
        player.size as f32,
        player.move_timer.progress_in_out_back(),
    );
    node.transform.position = position;
    node.transform.scale = Vec3::splat(PlayerState::scale_for(size));
}

pub(crate) fn draw_world(_player: &PlayerState, world: Mat4, out: &mut dyn DrawBackend) {
    // Mass is baked into the node scale, so the sphere itself is unit-sized
    out.draw_sphere(world, 1.0, BALL_COLOR);
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
