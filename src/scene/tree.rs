//! Generational arena scene tree and its traversals
//!
//! Nodes are stored in a slot arena and addressed by index+generation
//! handles, so parent/child links stay valid when slots are reused and a
//! freed node can never be reached through an old handle by accident.
//!
//! Tree invariants are correctness preconditions, not runtime conditions:
//! accessing a stale handle, attaching an already-parented node or removing a
//! non-child all panic.

use glam::{Mat4, Vec2, Vec3};

use crate::game::{LevelState, PlayerState, level, player};

use super::backend::{Color, DrawBackend, ModelId, TickContext};

/// Handle to a node in a [`SceneTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Local transform relative to the parent node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X, then Y, then Z
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Local matrix: scale, then rotation X/Y/Z, then translation
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_scale(self.scale)
    }
}

/// Decorative model prop drawn in the world pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropModel {
    pub model: ModelId,
    pub tint: Color,
}

/// Screen-space text drawn in the overlay pass; the node's `position.x/y`
/// are absolute pixels, no parent composition.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub font_size: f32,
    pub color: Color,
}

/// Closed set of node behaviors. The tree dispatches on this tag; there is no
/// open-ended subclassing.
#[derive(Debug)]
pub enum NodeKind {
    /// Plain grouping node with no behavior of its own
    Group,
    Level(Box<LevelState>),
    Player(PlayerState),
    Prop(PropModel),
    Label(TextLabel),
}

/// Tick/draw dispatch tag for [`NodeKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindTag {
    Group,
    Level,
    Player,
    Prop,
    Label,
}

impl NodeKind {
    fn tag(&self) -> KindTag {
        match self {
            NodeKind::Group => KindTag::Group,
            NodeKind::Level(_) => KindTag::Level,
            NodeKind::Player(_) => KindTag::Player,
            NodeKind::Prop(_) => KindTag::Prop,
            NodeKind::Label(_) => KindTag::Label,
        }
    }
}

/// One node: local transform, visibility, topology links, behavior data
#[derive(Debug)]
pub struct Node {
    pub transform: Transform,
    /// Gates drawing of this node and its whole subtree. Ticking is never
    /// gated; a hidden subtree keeps simulating.
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            transform: Transform::default(),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(kind: NodeKind, transform: Transform) -> Self {
        Self {
            transform,
            ..Self::new(kind)
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order; this is also traversal and draw order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Generational slot arena holding the whole scene
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free: Vec<usize>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached node, reusing a freed slot when one exists
    pub fn spawn(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.nodes[index] = Some(node);
            return NodeId {
                index: index as u32,
                generation: self.generations[index],
            };
        }
        let index = self.nodes.len();
        self.nodes.push(Some(node));
        self.generations.push(0);
        NodeId {
            index: index as u32,
            generation: 0,
        }
    }

    fn check(&self, id: NodeId) {
        let index = id.index as usize;
        let live = index < self.nodes.len()
            && self.generations[index] == id.generation
            && self.nodes[index].is_some();
        assert!(live, "stale node handle {id:?}");
    }

    pub fn contains(&self, id: NodeId) -> bool {
        let index = id.index as usize;
        index < self.nodes.len()
            && self.generations[index] == id.generation
            && self.nodes[index].is_some()
    }

    /// Panics on a stale handle; see the module contract
    pub fn node(&self, id: NodeId) -> &Node {
        self.check(id);
        self.nodes[id.index as usize].as_ref().unwrap()
    }

    /// Panics on a stale handle; see the module contract
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.check(id);
        self.nodes[id.index as usize].as_mut().unwrap()
    }

    /// Mutable access to two distinct nodes at once (e.g. a level and its
    /// player). Panics if the handles alias or either is stale.
    pub fn get2_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node, &mut Node) {
        assert_ne!(a.index, b.index, "get2_mut needs two distinct nodes");
        self.check(a);
        self.check(b);
        let (ai, bi) = (a.index as usize, b.index as usize);
        if ai < bi {
            let (lo, hi) = self.nodes.split_at_mut(bi);
            (lo[ai].as_mut().unwrap(), hi[0].as_mut().unwrap())
        } else {
            let (lo, hi) = self.nodes.split_at_mut(ai);
            (hi[0].as_mut().unwrap(), lo[bi].as_mut().unwrap())
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `child` to `parent`'s children and set the back-reference.
    ///
    /// A node has exactly one parent at a time; attaching a node that already
    /// has one is a contract violation and panics.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.check(parent);
        let child_node = self.node_mut(child);
        assert!(
            child_node.parent.is_none(),
            "node {child:?} is already attached"
        );
        child_node.parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Detach `child` from `parent`. Removing a node that is not a child of
    /// `parent` is a contract violation and panics; silently ignoring it
    /// would leave the back-reference pointing at a node that disowned it.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.check(child);
        let children = &mut self.node_mut(parent).children;
        let position = children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("{child:?} is not a child of {parent:?}"));
        children.remove(position);
        self.node_mut(child).parent = None;
    }

    /// Remove a node and its entire subtree from the arena, detaching it from
    /// its parent first if it has one.
    pub fn despawn(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.remove_child(parent, id);
        }
        self.despawn_subtree(id);
    }

    fn despawn_subtree(&mut self, id: NodeId) {
        self.check(id);
        let index = id.index as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        let node = self.nodes[index].take().unwrap();
        self.free.push(index);
        for child in node.children {
            self.despawn_subtree(child);
        }
    }

    /// One depth-first logic update: a node's own behavior runs first, then
    /// its children in insertion order. Visibility does not gate ticking.
    pub fn tick(&mut self, id: NodeId, ctx: &mut TickContext) {
        match self.node(id).kind.tag() {
            KindTag::Level => level::tick(self, id, ctx),
            KindTag::Player => player::tick(self, id, ctx),
            KindTag::Group | KindTag::Prop | KindTag::Label => {}
        }
        // Indexed walk: a node's tick may restructure its own subtree.
        let mut i = 0;
        loop {
            let Some(&child) = self.node(id).children.get(i) else {
                break;
            };
            self.tick(child, ctx);
            i += 1;
        }
    }

    /// World draw pass. `parent` is the composed ancestor matrix; threading
    /// it as an argument keeps the traversal balanced on every exit path
    /// (there is no global matrix stack to corrupt). An invisible node skips
    /// itself and its whole subtree.
    pub fn draw_world(&self, id: NodeId, parent: Mat4, out: &mut dyn DrawBackend) {
        let node = self.node(id);
        if !node.visible {
            return;
        }
        let world = parent * node.transform.to_matrix();
        match &node.kind {
            NodeKind::Level(state) => level::draw_world(state, world, out),
            NodeKind::Player(state) => player::draw_world(state, world, out),
            NodeKind::Prop(prop) => out.draw_model(world, prop.model, prop.tint),
            NodeKind::Group | NodeKind::Label(_) => {}
        }
        for &child in node.children() {
            self.draw_world(child, world, out);
        }
    }

    /// Screen-space overlay pass: no transform composition, node positions
    /// are absolute pixels. Same visibility gating as the world pass.
    pub fn draw_overlay(&self, id: NodeId, out: &mut dyn DrawBackend) {
        let node = self.node(id);
        if !node.visible {
            return;
        }
        if let NodeKind::Label(label) = &node.kind {
            let pos = Vec2::new(node.transform.position.x, node.transform.position.y);
            out.draw_text(pos, label.font_size, label.color, &label.text);
        }
        for &child in node.children() {
            self.draw_overlay(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::backend::RecordingBackend;

    fn group(tree: &mut SceneTree) -> NodeId {
        tree.spawn(Node::new(NodeKind::Group))
    }

    #[test]
    fn test_add_remove_child_preserves_sibling_order() {
        let mut tree = SceneTree::new();
        let root = group(&mut tree);
        let a = group(&mut tree);
        let b = group(&mut tree);
        let c = group(&mut tree);
        tree.add_child(root, a);
        tree.add_child(root, b);
        tree.add_child(root, c);

        tree.remove_child(root, b);
        assert_eq!(tree.node(root).children(), &[a, c]);
        assert_eq!(tree.node(b).parent(), None);

        tree.add_child(root, b);
        assert_eq!(tree.node(root).children(), &[a, c, b]);
        assert_eq!(tree.node(b).parent(), Some(root));
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn test_remove_non_child_panics() {
        let mut tree = SceneTree::new();
        let root = group(&mut tree);
        let stranger = group(&mut tree);
        tree.remove_child(root, stranger);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_double_attach_panics() {
        let mut tree = SceneTree::new();
        let a = group(&mut tree);
        let b = group(&mut tree);
        let child = group(&mut tree);
        tree.add_child(a, child);
        tree.add_child(b, child);
    }

    #[test]
    fn test_despawn_removes_subtree_and_invalidates_handles() {
        let mut tree = SceneTree::new();
        let root = group(&mut tree);
        let mid = group(&mut tree);
        let leaf = group(&mut tree);
        tree.add_child(root, mid);
        tree.add_child(mid, leaf);

        tree.despawn(mid);
        assert_eq!(tree.len(), 1);
        assert!(tree.node(root).children().is_empty());
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut tree = SceneTree::new();
        let a = group(&mut tree);
        tree.despawn(a);
        let b = group(&mut tree);
        // Same slot, different generation: the old handle stays dead
        assert_ne!(a, b);
        assert!(!tree.contains(a));
        assert!(tree.contains(b));
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn test_stale_handle_access_panics() {
        let mut tree = SceneTree::new();
        let a = group(&mut tree);
        tree.despawn(a);
        tree.node(a);
    }

    #[test]
    fn test_transform_composes_scale_rotation_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::splat(2.0),
        };
        // Unit X scaled to 2, rotated 90 degrees about Y (X -> -Z), then moved
        let out = transform.to_matrix().transform_point3(Vec3::X);
        let expected = Vec3::new(1.0, 2.0, 1.0);
        assert!((out - expected).length() < 1e-5, "{out} != {expected}");
    }

    #[test]
    fn test_invisible_subtree_skipped_in_both_passes() {
        let mut tree = SceneTree::new();
        let root = group(&mut tree);
        let hidden = group(&mut tree);
        let label = tree.spawn(Node::new(NodeKind::Label(TextLabel {
            text: "hi".into(),
            font_size: 20.0,
            color: Color::WHITE,
        })));
        let prop = tree.spawn(Node::new(NodeKind::Prop(PropModel {
            model: ModelId(7),
            tint: Color::WHITE,
        })));
        tree.add_child(root, hidden);
        tree.add_child(hidden, label);
        tree.add_child(hidden, prop);
        tree.node_mut(hidden).visible = false;

        let mut out = RecordingBackend::new();
        tree.draw_world(root, Mat4::IDENTITY, &mut out);
        tree.draw_overlay(root, &mut out);
        assert!(out.calls.is_empty());

        tree.node_mut(hidden).visible = true;
        tree.draw_world(root, Mat4::IDENTITY, &mut out);
        tree.draw_overlay(root, &mut out);
        assert_eq!(out.calls.len(), 2);
    }
}
