//! Raycast-style hit testing against the board.
//!
//! Mirrors what the host event system does with a physics/graphics raycast:
//! find the topmost raycast-blocking node under a board point, then bubble
//! up the ancestor chain to the nearest drop zone. A dragged tile has its
//! raycast blocking disabled, so it never hides the target beneath it; any
//! other blocking node can, which is why misdropping onto a resting tile is
//! a miss rather than a pass-through.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::scene::{NodeId, Scene};

/// Result of a drop-target query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// The topmost raycast-blocking node under the point.
    pub blocker: NodeId,
    /// The zone that receives the drop: `blocker` itself, or its nearest
    /// zone ancestor.
    pub zone: NodeId,
}

/// Whether the node's world-space rect contains `point`.
///
/// Edges are half-open (`[min, max)`), so adjacent slots never both claim
/// a boundary point. Zero-sized nodes contain nothing.
fn rect_contains(scene: &Scene, id: NodeId, point: Point) -> bool {
    let Some(node) = scene.get(id) else {
        return false;
    };
    if node.width <= 0.0 || node.height <= 0.0 {
        return false;
    }
    let origin = scene.world_pos(id);
    point.x >= origin.x
        && point.x < origin.x + node.width
        && point.y >= origin.y
        && point.y < origin.y + node.height
}

/// The topmost active, raycast-blocking node whose rect contains `point`.
///
/// Paint order is depth-first in sibling order (children draw over their
/// parent, later siblings over earlier ones), so the last match in
/// traversal order wins. Inactive subtrees are skipped entirely.
#[must_use]
pub fn top_blocker_at(scene: &Scene, point: Point) -> Option<NodeId> {
    let mut top = None;
    for &root in scene.roots() {
        visit(scene, root, point, &mut top);
    }
    top
}

fn visit(scene: &Scene, id: NodeId, point: Point, top: &mut Option<NodeId>) {
    let Some(node) = scene.get(id) else {
        return;
    };
    if !node.active {
        return;
    }
    if node.blocks_raycasts && rect_contains(scene, id, point) {
        *top = Some(id);
    }
    for &child in node.children() {
        visit(scene, child, point, top);
    }
}

/// The drop zone under `point`, after bubbling from the topmost blocker.
///
/// Returns `None` when nothing blocks the point, or when the blocker has no
/// zone on its ancestor chain; a drop there is a miss.
#[must_use]
pub fn drop_target_at(scene: &Scene, point: Point) -> Option<Hit> {
    let blocker = top_blocker_at(scene, point)?;
    let mut cursor = Some(blocker);
    while let Some(current) = cursor {
        let node = scene.get(current)?;
        if node.is_zone() {
            return Some(Hit { blocker, zone: current });
        }
        cursor = node.parent();
    }
    None
}
