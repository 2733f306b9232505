//! The external stage-controller boundary.
//!
//! Per-stage pass/fail logic, slot display text, scoring, and feedback all
//! live outside this crate. The engine talks to that logic through
//! [`StageController`], calling it synchronously from inside drop
//! resolution, so a controller always observes the result of a drop before
//! the next tick's input is processed. The engine never inspects controller
//! internals and never blocks on a reply beyond the call itself.

/// Puzzle-logic owner consuming drop and count notifications.
pub trait StageController {
    /// A symbolic tile was dropped on a slot. The controller alone judges
    /// correctness and owns the slot's display; the tile itself travels
    /// back to its tray after this call.
    fn on_slot_drop(&mut self, slot_index: usize, symbol: &str);

    /// Whether the slot may take a drop right now (staged reveals lock
    /// slots that are not yet in play). Denied drops are no-ops; the tile
    /// returns to its origin and nothing is forwarded.
    fn can_accept_drop(&mut self, _slot_index: usize) -> bool {
        true
    }

    /// The tile count under a counting container changed. Sent exactly once
    /// per accepted quantity drop, after the recount converges.
    fn report_count(&mut self, count: usize);
}
