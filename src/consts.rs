//! Shared numeric constants for the matching engine.

// ── Dragging ────────────────────────────────────────────────────

/// Opacity applied to a tile while it is being dragged.
pub const DRAG_ALPHA: f64 = 0.8;

/// Opacity restored when a drag ends, however it ends.
pub const FULL_ALPHA: f64 = 1.0;

/// Scale factor applied to raw screen deltas when no camera or canvas
/// resolves (the tier-3 movement fallback).
pub const DEFAULT_DRAG_SENSITIVITY: f64 = 1.0;

// ── Zones ───────────────────────────────────────────────────────

/// Slot index reported for a symbolic zone whose role never resolved.
pub const DEFAULT_SLOT_INDEX: usize = 0;

/// Name marker for the container holding a board's numbered slots. A
/// quantity zone whose parent carries this marker adopts that parent as
/// its discovery scope.
pub const SLOT_RACK_NAME: &str = "StoneSlots";
