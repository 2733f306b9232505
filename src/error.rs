//! Recoverable drop-rejection taxonomy.
//!
//! Nothing in the engine is fatal: every variant here describes a drop that
//! was silently rejected (or a fallback that engaged), after which the tile
//! is guaranteed to sit at a consistent location, either its origin or a
//! previously snapped slot, and the puzzle stays interactable.

/// Why a drop was rejected or a fallback engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    /// No camera or canvas could be resolved; pointer movement degraded to
    /// the scaled screen-delta fallback.
    #[error("no camera or canvas resolved; moving by scaled screen deltas")]
    ConfigurationMissing,
    /// Number-matched routing found no slot for the tile's number.
    #[error("no slot in scope matches number {number}")]
    NoMatchingTarget {
        number: u32,
    },
    /// The tile's embedded number does not match the slot it was dropped on.
    #[error("tile number {item} does not match slot number {slot}")]
    NumberMismatch {
        item: u32,
        slot: u32,
    },
    /// The drag ended without a matching end event; the tile was restored
    /// through the cancel path.
    #[error("drag gesture lost; tile restored to its origin")]
    GestureLost,
}
