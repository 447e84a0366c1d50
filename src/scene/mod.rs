//! Arena-backed scene tree and the host-facing draw/input seams
//!
//! Nodes live in a generational arena and are addressed by copyable handles;
//! parent/child links are handles, never pointers. The tree runs one tick
//! pass (depth-first, parent before children) and two draw passes (world with
//! composed transforms, then screen-space overlay) per frame.

pub mod backend;
pub mod tree;

pub use backend::{
    Camera, Color, Direction, DrawBackend, DrawCall, ModelId, MoveInput, RecordingBackend,
    TickContext,
};
pub use tree::{Node, NodeId, NodeKind, PropModel, SceneTree, TextLabel, Transform};
