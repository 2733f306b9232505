//! Board hierarchy store: containers, tiles, and zones as one node tree.
//!
//! This module defines the data types that describe what is on a puzzle
//! board (`Node`, `NodeKind`), the serde-facing layout description used to
//! load a whole board in one call (`NodeSpec`), and the runtime store that
//! owns all live nodes (`Scene`). Every node has exactly one parent at all
//! times; re-parenting is the only structural mutation that happens during
//! gameplay, and the store keeps the single-ownership invariant across it.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for a board node.
pub type NodeId = Uuid;

/// Position of a phoneme within a composed syllable block. Doubles as the
/// role of a symbolic slot: the slot that takes the initial consonant, the
/// vowel, or the final consonant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeClass {
    /// Initial consonant.
    Initial,
    /// Vowel.
    Medial,
    /// Final consonant.
    Final,
}

impl PhonemeClass {
    /// The slot index reported to the stage controller for this role.
    #[must_use]
    pub fn slot_index(self) -> usize {
        match self {
            Self::Initial => 0,
            Self::Medial => 1,
            Self::Final => 2,
        }
    }
}

/// Identity of a draggable tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// The glyph forwarded to the controller on a symbolic drop.
    pub symbol: String,
    /// Phoneme class of the glyph, when the tile is a phoneme tile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<PhonemeClass>,
}

/// Which matching rule a zone applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneRule {
    /// Forward the dropped symbol to the controller for judgement.
    Symbolic,
    /// Accept tiles whose embedded number matches, and recount.
    Quantity,
}

/// Static configuration of a drop zone. The resolved binding (role, number,
/// containers) is computed by the engine's binding pass and cached until the
/// next explicit refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub rule: ZoneRule,
    /// Explicit slot role; when absent the binding pass derives it from the
    /// registered role anchors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PhonemeClass>,
    /// Explicit slot number; when absent the binding pass parses the node
    /// name. Zero marks the generic board zone that routes by number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Container dropped tiles are parented into; defaults to the zone node.
    #[serde(skip)]
    pub slot_parent: Option<NodeId>,
    /// Discovery scope for number-matched routing.
    #[serde(skip)]
    pub slots_root: Option<NodeId>,
}

impl ZoneSpec {
    /// A symbolic slot with no explicit role (derived from anchors).
    #[must_use]
    pub fn symbolic() -> Self {
        Self { rule: ZoneRule::Symbolic, role: None, number: None, slot_parent: None, slots_root: None }
    }

    /// A quantity slot with no explicit number (parsed from the name).
    #[must_use]
    pub fn quantity() -> Self {
        Self { rule: ZoneRule::Quantity, role: None, number: None, slot_parent: None, slots_root: None }
    }
}

/// What a node is: plain container, draggable tile, or drop zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Item(ItemSpec),
    Zone(ZoneSpec),
}

/// A live board node.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Display name; participates in the `_<digits>` naming contract.
    pub name: String,
    pub kind: NodeKind,
    /// Position relative to the parent node (board units).
    pub local_pos: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees relative to the parent node.
    pub rotation: f64,
    /// Inactive nodes (and their subtrees) are invisible to hit testing.
    pub active: bool,
    /// Whether the node occludes pointer raycasts. Disabled on a tile for
    /// the duration of its drag so it cannot hide the target beneath it.
    pub blocks_raycasts: bool,
    pub alpha: f64,
    /// Set on snapped tiles so a flow-layout container leaves them where
    /// the zone placed them.
    pub ignore_layout: bool,
    /// Containers that flow-position their children.
    pub layout_group: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    #[must_use]
    pub fn is_item(&self) -> bool {
        matches!(self.kind, NodeKind::Item(_))
    }

    #[must_use]
    pub fn is_zone(&self) -> bool {
        matches!(self.kind, NodeKind::Zone(_))
    }

    /// The tile identity, when this node is a tile.
    #[must_use]
    pub fn item_spec(&self) -> Option<&ItemSpec> {
        match &self.kind {
            NodeKind::Item(spec) => Some(spec),
            _ => None,
        }
    }

    /// The zone configuration, when this node is a zone.
    #[must_use]
    pub fn zone_spec(&self) -> Option<&ZoneSpec> {
        match &self.kind {
            NodeKind::Zone(spec) => Some(spec),
            _ => None,
        }
    }

    #[must_use]
    pub fn zone_spec_mut(&mut self) -> Option<&mut ZoneSpec> {
        match &mut self.kind {
            NodeKind::Zone(spec) => Some(spec),
            _ => None,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Where to insert a node among its new siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingSlot {
    /// Append after all current children.
    Last,
    /// Insert at this index, clamped to the current child count.
    At(usize),
}

/// Serde-facing description of a board subtree. Hosts author boards as JSON
/// and load them in one call; tests build them in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default = "NodeSpec::default_kind")]
    pub kind: NodeKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "NodeSpec::default_true")]
    pub active: bool,
    #[serde(default = "NodeSpec::default_true")]
    pub blocks_raycasts: bool,
    #[serde(default)]
    pub layout_group: bool,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    fn default_kind() -> NodeKind {
        NodeKind::Container
    }

    fn default_true() -> bool {
        true
    }

    /// A container subtree with the given name.
    #[must_use]
    pub fn container(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: NodeKind::Container,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            active: true,
            blocks_raycasts: true,
            layout_group: false,
            children: Vec::new(),
        }
    }

    /// A draggable tile carrying the given symbol.
    #[must_use]
    pub fn item(name: &str, symbol: &str) -> Self {
        Self {
            kind: NodeKind::Item(ItemSpec { symbol: symbol.to_owned(), class: None }),
            ..Self::container(name)
        }
    }

    /// A drop zone with the given configuration.
    #[must_use]
    pub fn zone(name: &str, spec: ZoneSpec) -> Self {
        Self { kind: NodeKind::Zone(spec), ..Self::container(name) }
    }

    /// Position this subtree's root within its parent.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Size this subtree's root.
    #[must_use]
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Attach child subtrees.
    #[must_use]
    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }
}

/// In-memory store of board nodes.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate a layout subtree under `parent` (or as a root), returning
    /// the id of the subtree's root node.
    pub fn load_spec(&mut self, parent: Option<NodeId>, spec: &NodeSpec) -> NodeId {
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        let id = Uuid::new_v4();
        let node = Node {
            id,
            name: spec.name.clone(),
            kind: spec.kind.clone(),
            local_pos: Point::new(spec.x, spec.y),
            width: spec.width,
            height: spec.height,
            rotation: spec.rotation,
            active: spec.active,
            blocks_raycasts: spec.blocks_raycasts,
            alpha: 1.0,
            ignore_layout: false,
            layout_group: spec.layout_group,
            parent,
            children: Vec::new(),
        };
        self.nodes.insert(id, node);
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        for child in &spec.children {
            self.load_spec(Some(id), child);
        }
        id
    }

    /// Return a reference to a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Return a mutable reference to a node by id.
    #[must_use]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Root nodes in load order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node's parent, if it has one.
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// The node's children in sibling order. Unknown ids have no children.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Position of the node among its siblings.
    #[must_use]
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|&c| c == id)
    }

    /// Whether `node` is `root` itself or lies anywhere beneath it.
    #[must_use]
    pub fn is_within(&self, node: NodeId, root: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    /// The node's position in board coordinates (ancestor chain summed).
    #[must_use]
    pub fn world_pos(&self, id: NodeId) -> Point {
        let mut pos = Point::zero();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                break;
            };
            pos = pos + node.local_pos;
            cursor = node.parent;
        }
        pos
    }

    /// The node's rotation in board space (ancestor chain summed), degrees.
    #[must_use]
    pub fn world_rotation(&self, id: NodeId) -> f64 {
        let mut rotation = 0.0;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                break;
            };
            rotation += node.rotation;
            cursor = node.parent;
        }
        rotation
    }

    /// Move the node so its board-space position becomes `world`, keeping
    /// its current parent. Returns false for unknown ids.
    pub fn set_world_pos(&mut self, id: NodeId, world: Point) -> bool {
        if !self.contains(id) {
            return false;
        }
        let parent_world = self
            .parent_of(id)
            .map_or(Point::zero(), |p| self.world_pos(p));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_pos = world - parent_world;
        }
        true
    }

    /// Rotate the node so its board-space rotation becomes `world_deg`.
    pub fn set_world_rotation(&mut self, id: NodeId, world_deg: f64) -> bool {
        if !self.contains(id) {
            return false;
        }
        let parent_rotation = self
            .parent_of(id)
            .map_or(0.0, |p| self.world_rotation(p));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rotation = world_deg - parent_rotation;
        }
        true
    }

    /// All nodes beneath `root` (exclusive), depth-first in sibling order.
    /// Inactive subtrees are included; callers filter.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(root, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children_of(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Re-home a node under `new_parent` at the given sibling slot.
    ///
    /// `keep_world` preserves the node's board-space position and rotation
    /// across the move (used when lifting a tile onto the drag layer).
    /// Re-parenting to the current parent is permitted and re-slots the node
    /// among its siblings. Returns false, changing nothing, when either id
    /// is unknown or the move would make a node its own ancestor.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId, slot: SiblingSlot, keep_world: bool) -> bool {
        if !self.contains(id) || !self.contains(new_parent) {
            return false;
        }
        if self.is_within(new_parent, id) {
            return false;
        }
        let world = keep_world.then(|| (self.world_pos(id), self.world_rotation(id)));

        // Detach from the current parent or the root list.
        let old_parent = self.parent_of(id);
        match old_parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        // Attach under the new parent.
        if let Some(parent_node) = self.nodes.get_mut(&new_parent) {
            let index = match slot {
                SiblingSlot::Last => parent_node.children.len(),
                SiblingSlot::At(i) => i.min(parent_node.children.len()),
            };
            parent_node.children.insert(index, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }

        if let Some((pos, rotation)) = world {
            self.set_world_pos(id, pos);
            self.set_world_rotation(id, rotation);
        }
        true
    }
}
