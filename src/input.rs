//! Input model: pointer events, pointer resolution, and the drag state
//! machine.
//!
//! This module defines the types consumed by the engine. [`PointerEvent`]
//! captures one controller/pointer sample; [`resolve_pointer`] turns it into
//! a board position (or a delta nudge when nothing resolves); [`InputState`]
//! is the active gesture tracked between begin-drag and end-drag, carrying
//! the context needed to anchor the tile under the pointer and restore it if
//! the drop misses.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{CanvasSpace, Point};
use crate::scene::NodeId;

/// One pointer/controller sample delivered by the host per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerEvent {
    /// Pointer position in screen pixels.
    pub screen: Point,
    /// Screen-space movement since the previous sample.
    pub delta: Point,
    /// Ray/cursor intersection with the board surface, already in board
    /// coordinates, when the host's raycaster produced one. Correct for
    /// both flat and curved canvases.
    pub hit: Option<Point>,
}

/// Which tier of the resolution chain produced a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTier {
    /// The event carried a surface intersection.
    Hit,
    /// Screen position converted through the canvas configuration.
    Canvas,
}

/// Outcome of resolving a pointer event against a canvas configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    /// A board position was resolved.
    At {
        world: Point,
        tier: ResolveTier,
    },
    /// Nothing resolved; move by this scaled screen delta instead.
    Nudge {
        delta: Point,
    },
}

/// Resolve a pointer event to a board position.
///
/// Pure function of the event and configuration. Tiers, in priority order:
/// the event's surface intersection; the screen position converted through
/// the canvas; the raw screen delta scaled by `sensitivity` when no canvas
/// resolves at all.
#[must_use]
pub fn resolve_pointer(event: &PointerEvent, space: Option<&CanvasSpace>, sensitivity: f64) -> Resolved {
    if let Some(hit) = event.hit {
        return Resolved::At { world: hit, tier: ResolveTier::Hit };
    }
    match space {
        Some(space) => Resolved::At {
            world: space.screen_to_world(event.screen),
            tier: ResolveTier::Canvas,
        },
        None => Resolved::Nudge { delta: event.delta * sensitivity },
    }
}

/// Where a tile rested before its drag started. Captured once at begin-drag
/// and restored verbatim on a missed or cancelled drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginSnapshot {
    /// The container that owned the tile.
    pub parent: NodeId,
    /// The tile's position among its siblings, clamped to the parent's
    /// child count at restore time.
    pub sibling_index: usize,
    /// Local position the tile had under that parent.
    pub local_pos: Point,
}

/// Transient drag phase of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// At rest in its owning container.
    #[default]
    Idle,
    /// Following the pointer under the drag layer.
    Dragging,
    /// Claimed by a zone and parented into it.
    Snapped,
}

/// Engine-level gesture state. At most one tile drags at a time.
#[derive(Debug, Clone, Copy, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A tile is following the pointer.
    Dragging {
        /// The tile being dragged.
        item: NodeId,
        /// Where the tile came from.
        origin: OriginSnapshot,
        /// Pointer-to-tile offset captured at begin-drag so the tile stays
        /// anchored under the grab point instead of jumping to the pointer.
        grab_offset: Point,
    },
}
