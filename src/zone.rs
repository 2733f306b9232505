//! Slot roles, number matching, snapping, and occupancy counting.
//!
//! Two families of zone share this module. Symbolic slots resolve a role
//! (initial/medial/final) from the board hierarchy and forward dropped
//! glyphs to the stage controller. Quantity slots carry a number, explicit
//! or embedded in their name, and accept only tiles whose own embedded
//! number matches; the generic board zone (number 0) routes tiles to
//! whichever numbered sibling matches.
//!
//! Role and number resolution run as an explicit binding pass
//! ([`bind_zones`]) at engine construction and again on demand, never
//! ambiently; the results are cached in [`ZoneBindings`] until the next
//! refresh.

#[cfg(test)]
#[path = "zone_test.rs"]
mod zone_test;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::camera::Point;
use crate::consts::{DEFAULT_SLOT_INDEX, SLOT_RACK_NAME};
use crate::scene::{Node, NodeId, PhonemeClass, Scene, SiblingSlot};

/// Trailing `_<digits>`, the naming contract for number-based matching.
static EMBEDDED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)$").expect("embedded-number pattern is valid"));

/// Parse the number embedded in a node name. Names without a trailing
/// `_<digits>` (or with digits too large for `u32`) are unnumbered: 0.
#[must_use]
pub fn parse_embedded_number(name: &str) -> u32 {
    let Some(caps) = EMBEDDED_NUMBER.captures(name) else {
        return 0;
    };
    let Some(digits) = caps.get(1) else {
        return 0;
    };
    digits.as_str().parse().unwrap_or(0)
}

/// The three registered role containers. A symbolic slot placed anywhere
/// beneath one of these resolves to that role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleAnchors {
    anchors: [Option<NodeId>; 3],
}

impl RoleAnchors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the container for a role. Chainable for construction.
    #[must_use]
    pub fn with(mut self, class: PhonemeClass, container: NodeId) -> Self {
        self.anchors[class.slot_index()] = Some(container);
        self
    }

    pub fn set(&mut self, class: PhonemeClass, container: NodeId) {
        self.anchors[class.slot_index()] = Some(container);
    }

    #[must_use]
    pub fn get(&self, class: PhonemeClass) -> Option<NodeId> {
        self.anchors[class.slot_index()]
    }
}

/// Resolve a symbolic zone's role from ancestor-chain membership against
/// the registered anchors, tested in slot order.
#[must_use]
pub fn resolve_role(scene: &Scene, zone: NodeId, anchors: &RoleAnchors) -> Option<PhonemeClass> {
    [PhonemeClass::Initial, PhonemeClass::Medial, PhonemeClass::Final]
        .into_iter()
        .find(|&class| {
            anchors
                .get(class)
                .is_some_and(|anchor| scene.is_within(zone, anchor))
        })
}

/// A zone's number: the explicit configuration when set, else parsed from
/// the node name.
#[must_use]
pub fn resolve_number(scene: &Scene, zone: NodeId) -> u32 {
    let Some(node) = scene.get(zone) else {
        return 0;
    };
    match node.zone_spec().and_then(|spec| spec.number) {
        Some(number) => number,
        None => parse_embedded_number(&node.name),
    }
}

/// Resolved configuration of one zone, immutable until the next binding
/// pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneBinding {
    /// Role of a symbolic slot, when one resolved.
    pub role: Option<PhonemeClass>,
    /// Slot index reported to the controller.
    pub slot_index: usize,
    /// Number of a quantity slot; 0 is the generic board zone.
    pub number: u32,
    /// Explicitly configured container for dropped tiles; the zone node
    /// itself serves when absent.
    pub slot_parent: Option<NodeId>,
    /// Discovery scope for number-matched routing, when one resolved.
    pub slots_root: Option<NodeId>,
}

/// Binding cache for every zone in the scene, keyed by zone node.
#[derive(Debug, Clone, Default)]
pub struct ZoneBindings {
    bindings: HashMap<NodeId, ZoneBinding>,
}

impl ZoneBindings {
    #[must_use]
    pub fn get(&self, zone: NodeId) -> Option<&ZoneBinding> {
        self.bindings.get(&zone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Resolve every zone in the scene, active or not, into a fresh binding
/// cache. Depth-first in sibling order from the roots, so results are
/// deterministic.
#[must_use]
pub fn bind_zones(scene: &Scene, anchors: &RoleAnchors) -> ZoneBindings {
    let mut bindings = HashMap::new();
    for &root in scene.roots() {
        bind_node(scene, root, anchors, &mut bindings);
        for id in scene.descendants(root) {
            bind_node(scene, id, anchors, &mut bindings);
        }
    }
    ZoneBindings { bindings }
}

fn bind_node(scene: &Scene, id: NodeId, anchors: &RoleAnchors, out: &mut HashMap<NodeId, ZoneBinding>) {
    let Some(node) = scene.get(id) else {
        return;
    };
    let Some(spec) = node.zone_spec() else {
        return;
    };
    let role = spec.role.or_else(|| resolve_role(scene, id, anchors));
    let slot_parent = spec.slot_parent.filter(|&p| scene.contains(p));
    let slots_root = spec.slots_root.filter(|&r| scene.contains(r)).or_else(|| {
        scene
            .parent_of(id)
            .filter(|&p| scene.get(p).is_some_and(|n| n.name.contains(SLOT_RACK_NAME)))
    });
    out.insert(
        id,
        ZoneBinding {
            role,
            slot_index: role.map_or(DEFAULT_SLOT_INDEX, PhonemeClass::slot_index),
            number: resolve_number(scene, id),
            slot_parent,
            slots_root,
        },
    );
}

/// Count the tiles resting under `container`, transitively.
///
/// Walks every descendant, including those beneath nested zones, but
/// counts only tile nodes; zone-marked nodes are never counted. Calling
/// this twice without an intervening drop yields the same number.
#[must_use]
pub fn count_items(scene: &Scene, container: NodeId) -> usize {
    scene
        .descendants(container)
        .into_iter()
        .filter(|&id| scene.get(id).is_some_and(Node::is_item))
        .count()
}

/// Seat a tile in `container` at a zone's anchor.
///
/// The tile goes to the end of sibling order, opts out of the container's
/// flow layout when one is present, and centers on the container's anchor,
/// or copies position and rotation from `reference` (the matched slot zone)
/// when one is given. Raycast blocking and full opacity are restored so the
/// tile stays interactable. Returns false when ids are unknown or the move
/// would break the hierarchy.
pub fn snap_into(scene: &mut Scene, item: NodeId, container: NodeId, reference: Option<NodeId>) -> bool {
    if !scene.reparent(item, container, SiblingSlot::Last, false) {
        return false;
    }
    let container_is_layout = scene.get(container).is_some_and(|n| n.layout_group);
    if let Some(node) = scene.get_mut(item) {
        node.local_pos = Point::zero();
        node.rotation = 0.0;
        if container_is_layout {
            node.ignore_layout = true;
        }
        node.blocks_raycasts = true;
        node.alpha = crate::consts::FULL_ALPHA;
    }
    if let Some(reference) = reference.filter(|&r| scene.contains(r)) {
        let world = scene.world_pos(reference);
        let rotation = scene.world_rotation(reference);
        scene.set_world_pos(item, world);
        scene.set_world_rotation(item, rotation);
    }
    true
}
