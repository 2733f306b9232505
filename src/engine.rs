//! Top-level engine driving the drag lifecycle.
//!
//! The host feeds pointer events in; the engine mutates the board, calls
//! the injected [`StageController`] synchronously during drop resolution,
//! and returns [`Action`]s for the host to process. All state lives here or
//! in the [`Scene`]; there is no process-wide state, and every collaborator
//! (drag layer, canvas, role anchors, board root, controller) is injected.
//!
//! ## Tick ordering
//!
//! The engine is single-threaded and frame-driven. Within one tick at most
//! one begin/end transition is processed per tile; a second request is
//! dropped with a diagnostic and the gesture state is left untouched.
//! [`Engine::end_tick`] closes the frame and re-arms the guard. Cancellation
//! is exempt: a lost gesture must resolve immediately, whatever the tick has
//! already seen, so the tile is never left detached.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::camera::{CanvasSpace, Point};
use crate::consts::{DEFAULT_DRAG_SENSITIVITY, DRAG_ALPHA, FULL_ALPHA};
use crate::controller::StageController;
use crate::error::DropError;
use crate::hit;
use crate::input::{DragPhase, InputState, OriginSnapshot, PointerEvent, Resolved, resolve_pointer};
use crate::registry;
use crate::scene::{NodeId, Scene, SiblingSlot, ZoneRule};
use crate::zone::{self, RoleAnchors, ZoneBinding, ZoneBindings};

/// Structured events returned from every engine call, in the order they
/// occurred. Controller notifications have already happened by the time
/// actions are returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A drag began on this tile.
    DragStarted { item: NodeId },
    /// The dragged tile moved.
    DragMoved { item: NodeId },
    /// A zone claimed the tile; it now rests under `container`.
    ItemSnapped { item: NodeId, zone: NodeId, container: NodeId },
    /// The tile went back to its pre-drag parent and position.
    ItemReturned { item: NodeId },
    /// A symbolic drop was forwarded to the controller.
    SlotForwarded { zone: NodeId, slot_index: usize, symbol: String },
    /// A recount was reported to the controller for this container.
    CountReported { container: NodeId, count: usize },
    /// A drop was rejected; the tile is back at a consistent location.
    DropRejected { item: NodeId, reason: DropError },
    /// A container's flow layout must be recomputed (a sibling was removed
    /// or re-inserted).
    LayoutInvalidated { container: NodeId },
    /// Something visible changed.
    RenderNeeded,
}

/// Injected engine configuration. Changing it re-runs the zone binding
/// pass; nothing is re-resolved ambiently.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shared container dragged tiles are lifted into so they render above
    /// the rest of the board. Optional; tiles drag in place without one.
    pub drag_layer: Option<NodeId>,
    /// How the board's canvas maps screen to board coordinates. Absent on
    /// misconfigured rigs, which degrades movement to the delta fallback.
    pub canvas: Option<CanvasSpace>,
    /// Scale for the delta fallback.
    pub drag_sensitivity: f64,
    /// Role containers for symbolic slot resolution.
    pub role_anchors: RoleAnchors,
    /// Last-resort, narrowly-scoped search root for number-matched routing.
    pub board_root: Option<NodeId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_layer: None,
            canvas: None,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            role_anchors: RoleAnchors::default(),
            board_root: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// The drag-and-drop engine. Owns the board and the gesture state.
pub struct Engine {
    pub scene: Scene,
    config: EngineConfig,
    bindings: ZoneBindings,
    input: InputState,
    phases: HashMap<NodeId, DragPhase>,
    transitioned: HashSet<NodeId>,
    tick: u64,
}

impl Engine {
    /// Build an engine over a loaded board and run the zone binding pass.
    #[must_use]
    pub fn new(scene: Scene, config: EngineConfig) -> Self {
        let bindings = zone::bind_zones(&scene, &config.role_anchors);
        Self {
            scene,
            config,
            bindings,
            input: InputState::Idle,
            phases: HashMap::new(),
            transitioned: HashSet::new(),
            tick: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration and re-resolve every zone binding.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        self.rebind();
    }

    /// Re-run the zone binding pass against the current board. Call after
    /// structural edits to the board outside of normal drag traffic.
    pub fn rebind(&mut self) {
        self.bindings = zone::bind_zones(&self.scene, &self.config.role_anchors);
    }

    /// The resolved binding for a zone, if the binding pass has seen it.
    #[must_use]
    pub fn zone_binding(&self, zone: NodeId) -> Option<&ZoneBinding> {
        self.bindings.get(zone)
    }

    /// The tile currently being dragged, if any.
    #[must_use]
    pub fn dragging_item(&self) -> Option<NodeId> {
        match self.input {
            InputState::Dragging { item, .. } => Some(item),
            InputState::Idle => None,
        }
    }

    /// A tile's transient drag phase.
    #[must_use]
    pub fn drag_phase(&self, item: NodeId) -> DragPhase {
        self.phases.get(&item).copied().unwrap_or_default()
    }

    /// Tiles resting under `container`, transitively. Stable between drops.
    #[must_use]
    pub fn occupancy(&self, container: NodeId) -> usize {
        zone::count_items(&self.scene, container)
    }

    /// Recount a container and report the result to the controller. Drops
    /// do this on their own; hosts call it after editing the board.
    pub fn recount(&mut self, container: NodeId, controller: &mut dyn StageController) -> Vec<Action> {
        let count = zone::count_items(&self.scene, container);
        controller.report_count(count);
        vec![Action::CountReported { container, count }]
    }

    /// Close the current tick: re-arm the per-tile transition guard.
    pub fn end_tick(&mut self) {
        self.transitioned.clear();
        self.tick += 1;
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // --- Drag lifecycle ---

    /// Begin dragging a tile.
    ///
    /// Snapshots the tile's origin, lifts it onto the drag layer (keeping
    /// its board position), disables its raycast blocking so it cannot hide
    /// drop targets, and anchors it under the grab point. Rejected, with
    /// the gesture state untouched, when another drag is active, when the
    /// tile already transitioned this tick, or when `item` is not an
    /// active, container-owned tile.
    pub fn begin_drag(&mut self, item: NodeId, event: &PointerEvent) -> Vec<Action> {
        if let InputState::Dragging { item: active, .. } = self.input {
            warn!(%item, %active, "begin_drag rejected: a drag is already active");
            return Vec::new();
        }
        if self.transitioned.contains(&item) {
            warn!(%item, "begin_drag rejected: tile already transitioned this tick");
            return Vec::new();
        }
        let Some(node) = self.scene.get(item) else {
            warn!(%item, "begin_drag rejected: unknown tile");
            return Vec::new();
        };
        if !node.is_item() || !node.active {
            warn!(%item, "begin_drag rejected: not an active tile");
            return Vec::new();
        }
        let Some(parent) = self.scene.parent_of(item) else {
            warn!(%item, "begin_drag rejected: tile has no owning container");
            return Vec::new();
        };
        let origin = OriginSnapshot {
            parent,
            sibling_index: self.scene.sibling_index(item).unwrap_or(0),
            local_pos: node.local_pos,
        };
        let world_before = self.scene.world_pos(item);

        if let Some(node) = self.scene.get_mut(item) {
            node.blocks_raycasts = false;
            node.alpha = DRAG_ALPHA;
        }
        if let Some(layer) = self.config.drag_layer.filter(|&layer| layer != parent) {
            if !self.scene.reparent(item, layer, SiblingSlot::Last, true) {
                debug!(%item, "drag layer unusable; tile drags in place");
            }
        }
        let grab_offset = match self.resolve(event) {
            Resolved::At { world, .. } => world_before - world,
            Resolved::Nudge { .. } => {
                debug!(%item, reason = %DropError::ConfigurationMissing, "grab offset unavailable");
                Point::zero()
            }
        };

        self.phases.insert(item, DragPhase::Dragging);
        self.transitioned.insert(item);
        self.input = InputState::Dragging { item, origin, grab_offset };
        vec![Action::DragStarted { item }, Action::RenderNeeded]
    }

    /// Move the dragged tile to follow the pointer.
    pub fn drag_move(&mut self, event: &PointerEvent) -> Vec<Action> {
        let InputState::Dragging { item, grab_offset, .. } = self.input else {
            return Vec::new();
        };
        if !self.scene.contains(item) {
            warn!(%item, "dragged tile vanished; dropping the gesture");
            self.input = InputState::Idle;
            return Vec::new();
        }
        match self.resolve(event) {
            Resolved::At { world, .. } => {
                self.scene.set_world_pos(item, world + grab_offset);
            }
            Resolved::Nudge { delta } => {
                if let Some(node) = self.scene.get_mut(item) {
                    node.local_pos = node.local_pos + delta;
                }
            }
        }
        vec![Action::DragMoved { item }, Action::RenderNeeded]
    }

    /// End the drag: resolve the drop zone under the pointer and either let
    /// it claim the tile or restore the origin snapshot. When no board
    /// point resolves (delta-fallback rigs) the drop has no target and the
    /// tile goes home.
    ///
    /// Zone callbacks into `controller` run synchronously before this
    /// returns, so the controller observes the drop result within the same
    /// tick. If the tile already transitioned this tick the end is deferred
    /// (the gesture stays active) for the host to retry after `end_tick`.
    pub fn end_drag(&mut self, event: &PointerEvent, controller: &mut dyn StageController) -> Vec<Action> {
        let InputState::Dragging { item, origin, .. } = self.input else {
            debug!("end_drag ignored: no active drag");
            return Vec::new();
        };
        if self.transitioned.contains(&item) {
            warn!(%item, "end_drag deferred: tile already transitioned this tick");
            return Vec::new();
        }
        self.input = InputState::Idle;
        self.transitioned.insert(item);

        let mut actions = Vec::new();
        if !self.scene.contains(item) {
            warn!(%item, "dragged tile vanished before the drop resolved");
            return actions;
        }

        // Hit-test while the tile is still transparent to raycasts.
        let drop_point = match self.resolve(event) {
            Resolved::At { world, .. } => Some(world),
            Resolved::Nudge { .. } => None,
        };
        let target = drop_point.and_then(|point| hit::drop_target_at(&self.scene, point));

        let claimed = match target {
            Some(hit) => self.resolve_drop(item, hit.zone, controller, &mut actions),
            None => false,
        };
        if claimed {
            // The vacated container's flow layout shifts too.
            actions.push(Action::LayoutInvalidated { container: origin.parent });
        } else {
            self.restore_origin(item, origin, &mut actions);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Cancel a drag whose end event was lost. Always restores the origin
    /// snapshot and re-enables interactability; exempt from the tick guard
    /// so a tile can never be stranded on the drag layer.
    pub fn cancel_drag(&mut self) -> Vec<Action> {
        let InputState::Dragging { item, origin, .. } = self.input else {
            return Vec::new();
        };
        self.input = InputState::Idle;
        self.transitioned.insert(item);
        warn!(%item, reason = %DropError::GestureLost, "drag cancelled");

        let mut actions = vec![Action::DropRejected { item, reason: DropError::GestureLost }];
        self.restore_origin(item, origin, &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Safety net for hosts whose input system reports a bare "pointer
    /// released" without a matching end event: while a drag is still
    /// conceptually active, treat it as an end with no resolvable target.
    pub fn pointer_released(&mut self) -> Vec<Action> {
        let InputState::Dragging { item, origin, .. } = self.input else {
            return Vec::new();
        };
        self.input = InputState::Idle;
        self.transitioned.insert(item);
        debug!(%item, "pointer released with no end event; restoring origin");

        let mut actions = Vec::new();
        self.restore_origin(item, origin, &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Drop resolution ---

    fn resolve(&self, event: &PointerEvent) -> Resolved {
        resolve_pointer(event, self.config.canvas.as_ref(), self.config.drag_sensitivity)
    }

    /// Let `zone_id` decide the fate of the dropped tile. Returns whether
    /// the tile was claimed. Symbolic forwards never claim; the tile
    /// travels back to its tray.
    fn resolve_drop(
        &mut self,
        item: NodeId,
        zone_id: NodeId,
        controller: &mut dyn StageController,
        actions: &mut Vec<Action>,
    ) -> bool {
        let Some(rule) = self.scene.get(zone_id).and_then(|n| n.zone_spec()).map(|s| s.rule) else {
            return false;
        };
        let Some(binding) = self.bindings.get(zone_id).copied() else {
            warn!(%zone_id, "drop on an unbound zone; rebind required");
            return false;
        };
        match rule {
            ZoneRule::Symbolic => {
                self.forward_symbolic(item, zone_id, &binding, controller, actions);
                false
            }
            ZoneRule::Quantity => self.route_quantity(item, zone_id, &binding, controller, actions),
        }
    }

    fn forward_symbolic(
        &mut self,
        item: NodeId,
        zone_id: NodeId,
        binding: &ZoneBinding,
        controller: &mut dyn StageController,
        actions: &mut Vec<Action>,
    ) {
        let Some(symbol) = self
            .scene
            .get(item)
            .and_then(|n| n.item_spec())
            .map(|spec| spec.symbol.clone())
        else {
            return;
        };
        let slot_index = binding.slot_index;
        if !controller.can_accept_drop(slot_index) {
            debug!(%item, slot_index, "slot gated; drop suppressed");
            return;
        }
        controller.on_slot_drop(slot_index, &symbol);
        debug!(%item, slot_index, symbol = %symbol, "symbolic drop forwarded");
        actions.push(Action::SlotForwarded { zone: zone_id, slot_index, symbol });
    }

    fn route_quantity(
        &mut self,
        item: NodeId,
        zone_id: NodeId,
        binding: &ZoneBinding,
        controller: &mut dyn StageController,
        actions: &mut Vec<Action>,
    ) -> bool {
        let item_number = self
            .scene
            .get(item)
            .map_or(0, |n| zone::parse_embedded_number(&n.name));

        if binding.number == 0 {
            // The generic board zone: route to the number-matched sibling.
            let scope = binding
                .slots_root
                .or(binding.slot_parent)
                .or(self.config.board_root);
            let target = scope.and_then(|root| {
                registry::find_zone_by_number(&self.scene, &self.bindings, root, item_number, zone_id)
            });
            let Some(target_zone) = target else {
                warn!(%item, number = item_number, "no slot in scope matches the tile");
                actions.push(Action::DropRejected {
                    item,
                    reason: DropError::NoMatchingTarget { number: item_number },
                });
                return false;
            };
            let container = self
                .bindings
                .get(target_zone)
                .and_then(|b| b.slot_parent)
                .unwrap_or(target_zone);
            return self.claim(item, target_zone, container, controller, actions);
        }

        if item_number != binding.number {
            warn!(%item, item_number, slot_number = binding.number, "tile number does not match the slot");
            actions.push(Action::DropRejected {
                item,
                reason: DropError::NumberMismatch { item: item_number, slot: binding.number },
            });
            return false;
        }
        let container = binding.slot_parent.unwrap_or(zone_id);
        self.claim(item, zone_id, container, controller, actions)
    }

    /// Seat the tile under the claiming zone and reconverge the count.
    fn claim(
        &mut self,
        item: NodeId,
        zone_id: NodeId,
        container: NodeId,
        controller: &mut dyn StageController,
        actions: &mut Vec<Action>,
    ) -> bool {
        if !zone::snap_into(&mut self.scene, item, container, Some(zone_id)) {
            warn!(%item, %container, "snap failed; restoring the tile");
            return false;
        }
        self.phases.insert(item, DragPhase::Snapped);
        actions.push(Action::ItemSnapped { item, zone: zone_id, container });

        let count = zone::count_items(&self.scene, container);
        controller.report_count(count);
        debug!(%container, count, "occupancy reconverged");
        actions.push(Action::CountReported { container, count });
        true
    }

    /// Put a tile back exactly where its drag began, clamping the
    /// remembered sibling index to the parent's current child count.
    fn restore_origin(&mut self, item: NodeId, origin: OriginSnapshot, actions: &mut Vec<Action>) {
        if self.scene.contains(origin.parent) {
            if self
                .scene
                .reparent(item, origin.parent, SiblingSlot::At(origin.sibling_index), false)
            {
                if let Some(node) = self.scene.get_mut(item) {
                    node.local_pos = origin.local_pos;
                }
            }
        } else {
            warn!(%item, "origin container vanished; tile keeps its current parent");
        }
        if let Some(node) = self.scene.get_mut(item) {
            node.blocks_raycasts = true;
            node.alpha = FULL_ALPHA;
        }
        self.phases.insert(item, DragPhase::Idle);
        actions.push(Action::ItemReturned { item });
        actions.push(Action::LayoutInvalidated { container: origin.parent });
    }
}
