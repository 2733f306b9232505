//! Drag-and-drop matching engine for the phoneme and stone-counting puzzles.
//!
//! This crate is the headless gameplay core shared by the matching stages: a
//! learner drags a phoneme tile onto one of three composition slots, or drags
//! a numbered stone token onto a counting board. The engine owns the board
//! hierarchy, the drag lifecycle, drop validation and routing, and occupancy
//! counting. It never renders and never decides puzzle pass/fail; those
//! belong to the host and to the [`controller::StageController`] it injects.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] driving the drag lifecycle |
//! | [`scene`] | Board hierarchy store: containers, items, zones |
//! | [`camera`] | Per-canvas camera and coordinate conversions |
//! | [`input`] | Pointer events and the drag state machine |
//! | [`hit`] | Raycast-style hit testing against the board |
//! | [`zone`] | Slot roles, number matching, occupancy counting |
//! | [`registry`] | Zone discovery and number-matched lookup |
//! | [`controller`] | External stage-controller boundary |
//! | [`error`] | Recoverable drop-rejection taxonomy |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod consts;
pub mod controller;
pub mod engine;
pub mod error;
pub mod hit;
pub mod input;
pub mod registry;
pub mod scene;
pub mod zone;
