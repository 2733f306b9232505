//! Zone discovery and number-matched lookup.
//!
//! The generic board zone routes a dropped tile to whichever sibling slot
//! carries the tile's number. This module owns that search: enumerate every
//! zone beneath a scope root (inactive ones included, since puzzle slots
//! are toggled during staged reveals) and pick the first whose number
//! matches. Traversal is depth-first in sibling order, so when two zones
//! carry the same number the winner is deterministic across runs.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use crate::scene::{Node, NodeId, Scene};
use crate::zone::{self, ZoneBindings};

/// All zone nodes at or beneath `root`, depth-first in sibling order.
/// Inactive zones are included.
#[must_use]
pub fn zones_under(scene: &Scene, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    if scene.get(root).is_some_and(Node::is_zone) {
        out.push(root);
    }
    out.extend(
        scene
            .descendants(root)
            .into_iter()
            .filter(|&id| scene.get(id).is_some_and(Node::is_zone)),
    );
    out
}

/// The first zone under `root` whose number equals `number`, skipping
/// `exclude` (the searching zone itself). Unnumbered targets never match:
/// a `number` of 0 finds nothing.
///
/// Candidate numbers come from the binding cache when bound, else resolve
/// the same way the binding pass does (explicit field, then name).
#[must_use]
pub fn find_zone_by_number(
    scene: &Scene,
    bindings: &ZoneBindings,
    root: NodeId,
    number: u32,
    exclude: NodeId,
) -> Option<NodeId> {
    if number == 0 {
        return None;
    }
    zones_under(scene, root).into_iter().find(|&candidate| {
        if candidate == exclude {
            return false;
        }
        let candidate_number = bindings
            .get(candidate)
            .map_or_else(|| zone::resolve_number(scene, candidate), |b| b.number);
        candidate_number == number
    })
}
