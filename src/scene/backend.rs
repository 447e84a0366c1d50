//! Host-facing seams: draw primitives, camera output, per-frame input
//!
//! The core never talks to a window, a GPU or a font library. Each frame the
//! host builds a [`TickContext`] from sampled input and elapsed time, runs the
//! tick, reads the camera back out of the context, then hands a
//! [`DrawBackend`] to the world and overlay draw passes.

use glam::{Mat4, Vec2, Vec3};

/// RGBA8 color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(24, 20, 18);
}

/// Opaque handle to a host-loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Camera pose computed by the active level each tick; the host applies it
/// before the world draw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Vec3,
    pub position: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            position: Vec3::new(0.0, 10.0, 1.0),
        }
    }
}

/// Cardinal movement directions on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed evaluation order for same-frame inputs
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid-space step: columns grow right, rows grow toward the camera
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Direction released-this-frame flags, sampled once per frame by the host.
///
/// The four axes are independent booleans; the level only evaluates them when
/// the player is free to move, so mid-animation presses are dropped, never
/// queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {
    pub fn released(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// Per-frame context threaded through the tick traversal
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    /// Frame delta in seconds (host supplied, non-negative)
    pub dt: f32,
    pub input: MoveInput,
    /// Written by the active level, read by the host after the tick
    pub camera: Camera,
}

impl TickContext {
    pub fn new(dt: f32, input: MoveInput) -> Self {
        Self {
            dt,
            input,
            camera: Camera::default(),
        }
    }
}

/// Primitive draw calls the host renders. World-space parameters are final;
/// the core has already composed all parent transforms.
pub trait DrawBackend {
    /// Axis-aligned plane centered at the transform origin, `size` in XZ
    fn draw_plane(&mut self, transform: Mat4, size: Vec2, color: Color);
    /// Unit-radius-relative sphere at the transform origin
    fn draw_sphere(&mut self, transform: Mat4, radius: f32, color: Color);
    /// Flat circle on the XZ plane (cell markers)
    fn draw_circle(&mut self, transform: Mat4, radius: f32, color: Color);
    /// Host-loaded textured model
    fn draw_model(&mut self, transform: Mat4, model: ModelId, tint: Color);
    /// Screen-space text, `pos` in pixels from the top-left
    fn draw_text(&mut self, pos: Vec2, font_size: f32, color: Color, text: &str);
}

/// One call recorded by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Plane {
        transform: Mat4,
        size: Vec2,
        color: Color,
    },
    Sphere {
        transform: Mat4,
        radius: f32,
        color: Color,
    },
    Circle {
        transform: Mat4,
        radius: f32,
        color: Color,
    },
    Model {
        transform: Mat4,
        model: ModelId,
        tint: Color,
    },
    Text {
        pos: Vec2,
        font_size: f32,
        color: Color,
        text: String,
    },
}

/// Headless backend that records every draw call. The test suite inspects the
/// call list instead of pixels; hosts can use it for golden-frame checks.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawBackend for RecordingBackend {
    fn draw_plane(&mut self, transform: Mat4, size: Vec2, color: Color) {
        self.calls.push(DrawCall::Plane {
            transform,
            size,
            color,
        });
    }

    fn draw_sphere(&mut self, transform: Mat4, radius: f32, color: Color) {
        self.calls.push(DrawCall::Sphere {
            transform,
            radius,
            color,
        });
    }

    fn draw_circle(&mut self, transform: Mat4, radius: f32, color: Color) {
        self.calls.push(DrawCall::Circle {
            transform,
            radius,
            color,
        });
    }

    fn draw_model(&mut self, transform: Mat4, model: ModelId, tint: Color) {
        self.calls.push(DrawCall::Model {
            transform,
            model,
            tint,
        });
    }

    fn draw_text(&mut self, pos: Vec2, font_size: f32, color: Color, text: &str) {
        self.calls.push(DrawCall::Text {
            pos,
            font_size,
            color,
            text: text.to_string(),
        });
    }
}
