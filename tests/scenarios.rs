//! End-to-end puzzle scenarios driven through the public API, on boards
//! loaded from the JSON layout format hosts use.

use matchboard::camera::{CanvasSpace, Point};
use matchboard::controller::StageController;
use matchboard::engine::{Action, Engine, EngineConfig};
use matchboard::error::DropError;
use matchboard::input::{DragPhase, PointerEvent};
use matchboard::scene::{Node, NodeId, NodeSpec, Scene};
use matchboard::zone::RoleAnchors;

#[derive(Default)]
struct Recorder {
    slot_drops: Vec<(usize, String)>,
    counts: Vec<usize>,
    denied_slots: Vec<usize>,
}

impl StageController for Recorder {
    fn on_slot_drop(&mut self, slot_index: usize, symbol: &str) {
        self.slot_drops.push((slot_index, symbol.to_owned()));
    }

    fn can_accept_drop(&mut self, slot_index: usize) -> bool {
        !self.denied_slots.contains(&slot_index)
    }

    fn report_count(&mut self, count: usize) {
        self.counts.push(count);
    }
}

fn ev(x: f64, y: f64) -> PointerEvent {
    PointerEvent { screen: Point::new(x, y), ..Default::default() }
}

const STONE_BOARD_JSON: &str = r#"
{
  "name": "Board", "width": 400, "height": 400,
  "children": [
    { "name": "DragLayer" },
    { "name": "Tray", "y": 300, "width": 400, "height": 100,
      "children": [
        { "name": "Stone_3", "kind": { "type": "item", "symbol": "stone" },
          "x": 10, "y": 10, "width": 40, "height": 40 },
        { "name": "Stone_5", "kind": { "type": "item", "symbol": "stone" },
          "x": 60, "y": 10, "width": 40, "height": 40 }
      ] },
    { "name": "CountDisplay", "kind": { "type": "zone", "rule": "quantity" },
      "width": 400, "height": 200,
      "children": [
        { "name": "StoneSlots",
          "children": [
            { "name": "Slot_2", "kind": { "type": "zone", "rule": "quantity" },
              "x": 70, "y": 10, "width": 50, "height": 50 },
            { "name": "Slot_3", "kind": { "type": "zone", "rule": "quantity" },
              "x": 130, "y": 10, "width": 50, "height": 50 }
          ] }
      ] }
  ]
}
"#;

struct StoneRig {
    engine: Engine,
    tray: NodeId,
    slot_2: NodeId,
    slot_3: NodeId,
    stone_3: NodeId,
    stone_5: NodeId,
}

fn find_by_name(scene: &Scene, name: &str) -> NodeId {
    let mut matches = scene.roots().iter().copied().filter(|&r| {
        scene.get(r).is_some_and(|n| n.name == name)
    });
    if let Some(found) = matches.next() {
        return found;
    }
    scene
        .roots()
        .iter()
        .flat_map(|&r| scene.descendants(r))
        .find(|&id| scene.get(id).is_some_and(|n| n.name == name))
        .unwrap_or_else(|| panic!("no node named {name}"))
}

fn stone_rig() -> StoneRig {
    let spec: NodeSpec = serde_json::from_str(STONE_BOARD_JSON).expect("board json parses");
    let mut scene = Scene::new();
    scene.load_spec(None, &spec);

    let display = find_by_name(&scene, "CountDisplay");
    let rack = find_by_name(&scene, "StoneSlots");
    if let Some(zone) = scene.get_mut(display).and_then(Node::zone_spec_mut) {
        zone.slots_root = Some(rack);
    }
    let config = EngineConfig {
        drag_layer: Some(find_by_name(&scene, "DragLayer")),
        canvas: Some(CanvasSpace::Overlay),
        ..EngineConfig::new()
    };
    StoneRig {
        tray: find_by_name(&scene, "Tray"),
        slot_2: find_by_name(&scene, "Slot_2"),
        slot_3: find_by_name(&scene, "Slot_3"),
        stone_3: find_by_name(&scene, "Stone_3"),
        stone_5: find_by_name(&scene, "Stone_5"),
        engine: Engine::new(scene, config),
    }
}

fn drag_to(engine: &mut Engine, item: NodeId, from: PointerEvent, to: PointerEvent, controller: &mut dyn StageController) -> Vec<Action> {
    engine.begin_drag(item, &from);
    engine.drag_move(&to);
    engine.end_tick();
    let actions = engine.end_drag(&to, controller);
    engine.end_tick();
    actions
}

// --- Scenario A: board zone routes by number ---

#[test]
fn stone_lands_in_number_matched_slot() {
    let mut rig = stone_rig();
    let mut recorder = Recorder::default();
    let actions = drag_to(&mut rig.engine, rig.stone_3, ev(30.0, 330.0), ev(300.0, 150.0), &mut recorder);

    assert_eq!(rig.engine.scene.parent_of(rig.stone_3), Some(rig.slot_3));
    assert_eq!(rig.engine.occupancy(rig.slot_3), 1);
    assert_eq!(recorder.counts, [1]);
    assert!(actions.iter().any(|a| matches!(
        a,
        Action::ItemSnapped { zone, .. } if *zone == rig.slot_3
    )));
}

// --- Scenario B: mismatched number is rejected ---

#[test]
fn stone_bounces_off_mismatched_slot() {
    let mut rig = stone_rig();
    if let Some(zone) = rig.engine.scene.get_mut(rig.slot_2).and_then(Node::zone_spec_mut) {
        zone.number = Some(2);
    }
    rig.engine.rebind();
    let mut recorder = Recorder::default();
    let origin = rig.engine.scene.get(rig.stone_5).map(|n| n.local_pos);
    let actions = drag_to(&mut rig.engine, rig.stone_5, ev(80.0, 330.0), ev(90.0, 30.0), &mut recorder);

    assert!(actions.iter().any(|a| matches!(
        a,
        Action::DropRejected { reason: DropError::NumberMismatch { item: 5, slot: 2 }, .. }
    )));
    assert!(recorder.counts.is_empty());
    assert_eq!(rig.engine.scene.parent_of(rig.stone_5), Some(rig.tray));
    assert_eq!(rig.engine.scene.get(rig.stone_5).map(|n| n.local_pos), origin);
}

// --- Scenario C: gated symbolic slot suppresses the forward ---

const PHONEME_BOARD_JSON: &str = r#"
{
  "name": "Board", "width": 400, "height": 400,
  "children": [
    { "name": "DragLayer" },
    { "name": "Tray", "y": 300, "width": 400, "height": 100,
      "children": [
        { "name": "Tile", "kind": { "type": "item", "symbol": "ㅏ" },
          "x": 10, "y": 10, "width": 40, "height": 40 }
      ] },
    { "name": "MedialBox", "x": 100, "width": 100, "height": 100,
      "children": [
        { "name": "SlotBox", "kind": { "type": "zone", "rule": "symbolic" },
          "x": 25, "y": 25, "width": 50, "height": 50 }
      ] }
  ]
}
"#;

#[test]
fn gated_medial_slot_swallows_the_drop() {
    let spec: NodeSpec = serde_json::from_str(PHONEME_BOARD_JSON).expect("board json parses");
    let mut scene = Scene::new();
    scene.load_spec(None, &spec);
    let tray = find_by_name(&scene, "Tray");
    let tile = find_by_name(&scene, "Tile");
    let config = EngineConfig {
        drag_layer: Some(find_by_name(&scene, "DragLayer")),
        canvas: Some(CanvasSpace::Overlay),
        role_anchors: RoleAnchors::new()
            .with(matchboard::scene::PhonemeClass::Medial, find_by_name(&scene, "MedialBox")),
        ..EngineConfig::new()
    };
    let mut engine = Engine::new(scene, config);
    let mut recorder = Recorder { denied_slots: vec![1], ..Recorder::default() };

    let actions = drag_to(&mut engine, tile, ev(30.0, 330.0), ev(150.0, 50.0), &mut recorder);

    assert!(recorder.slot_drops.is_empty());
    assert!(!actions.iter().any(|a| matches!(a, Action::SlotForwarded { .. })));
    assert_eq!(engine.scene.parent_of(tile), Some(tray));
    assert_eq!(engine.drag_phase(tile), DragPhase::Idle);
}

// --- Scenario D: gesture lost mid-drag ---

#[test]
fn lost_gesture_ends_the_tick_idle_at_origin() {
    let mut rig = stone_rig();
    let origin_pos = rig.engine.scene.get(rig.stone_3).map(|n| n.local_pos);
    rig.engine.begin_drag(rig.stone_3, &ev(30.0, 330.0));
    rig.engine.drag_move(&ev(200.0, 100.0));

    let actions = rig.engine.cancel_drag();
    rig.engine.end_tick();

    assert!(actions.iter().any(|a| matches!(
        a,
        Action::DropRejected { reason: DropError::GestureLost, .. }
    )));
    assert_eq!(rig.engine.drag_phase(rig.stone_3), DragPhase::Idle);
    assert_eq!(rig.engine.scene.parent_of(rig.stone_3), Some(rig.tray));
    assert_eq!(rig.engine.scene.get(rig.stone_3).map(|n| n.local_pos), origin_pos);
    assert!(rig.engine.scene.get(rig.stone_3).is_some_and(|n| n.blocks_raycasts));
}

// --- Scenario E: duplicate numbers resolve deterministically ---

fn duplicate_board() -> (Engine, NodeId) {
    let mut scene = Scene::new();
    let spec = NodeSpec::container("Board")
        .sized(400.0, 400.0)
        .with_children(vec![
            NodeSpec::container("DragLayer"),
            NodeSpec::container("Tray").at(0.0, 300.0).sized(400.0, 100.0).with_children(vec![
                NodeSpec::item("Stone_4", "stone").at(10.0, 10.0).sized(40.0, 40.0),
            ]),
            NodeSpec::zone("CountDisplay", matchboard::scene::ZoneSpec::quantity())
                .sized(400.0, 200.0)
                .with_children(vec![NodeSpec::container("StoneSlots").with_children(vec![
                    NodeSpec::container("RowA").with_children(vec![
                        NodeSpec::zone("Slot_4", matchboard::scene::ZoneSpec::quantity())
                            .at(10.0, 10.0)
                            .sized(50.0, 50.0),
                    ]),
                    NodeSpec::zone("Slot_4", matchboard::scene::ZoneSpec::quantity())
                        .at(200.0, 10.0)
                        .sized(50.0, 50.0),
                ])]),
        ]);
    scene.load_spec(None, &spec);
    let display = find_by_name(&scene, "CountDisplay");
    let rack = find_by_name(&scene, "StoneSlots");
    if let Some(zone) = scene.get_mut(display).and_then(Node::zone_spec_mut) {
        zone.slots_root = Some(rack);
    }
    let config = EngineConfig {
        drag_layer: Some(find_by_name(&scene, "DragLayer")),
        canvas: Some(CanvasSpace::Overlay),
        ..EngineConfig::new()
    };
    let stone = find_by_name(&scene, "Stone_4");
    (Engine::new(scene, config), stone)
}

#[test]
fn duplicate_slot_numbers_pick_the_same_winner_every_run() {
    for _ in 0..3 {
        let (mut engine, stone) = duplicate_board();
        let mut recorder = Recorder::default();
        drag_to(&mut engine, stone, ev(30.0, 330.0), ev(350.0, 180.0), &mut recorder);

        // The nested RowA slot comes first in traversal order.
        let winner = engine.scene.parent_of(stone).expect("stone is owned");
        let winner_parent = engine.scene.parent_of(winner);
        let parent_name = winner_parent
            .and_then(|p| engine.scene.get(p))
            .map(|n| n.name.clone());
        assert_eq!(parent_name.as_deref(), Some("RowA"));
    }
}

// --- Cross-cutting invariants ---

#[test]
fn every_drop_leaves_single_ownership() {
    let mut rig = stone_rig();
    let mut recorder = Recorder::default();

    drag_to(&mut rig.engine, rig.stone_3, ev(30.0, 330.0), ev(300.0, 150.0), &mut recorder);
    drag_to(&mut rig.engine, rig.stone_5, ev(80.0, 330.0), ev(390.0, 390.0), &mut recorder);

    for item in [rig.stone_3, rig.stone_5] {
        assert!(rig.engine.scene.parent_of(item).is_some());
        let owners = rig
            .engine
            .scene
            .roots()
            .iter()
            .flat_map(|&r| {
                let mut nodes = vec![r];
                nodes.extend(rig.engine.scene.descendants(r));
                nodes
            })
            .filter(|&n| rig.engine.scene.children_of(n).contains(&item))
            .count();
        assert_eq!(owners, 1);
    }
}

#[test]
fn recount_is_idempotent_through_the_engine() {
    let mut rig = stone_rig();
    let mut recorder = Recorder::default();
    drag_to(&mut rig.engine, rig.stone_3, ev(30.0, 330.0), ev(300.0, 150.0), &mut recorder);

    rig.engine.recount(rig.slot_3, &mut recorder);
    rig.engine.recount(rig.slot_3, &mut recorder);
    assert_eq!(recorder.counts, [1, 1, 1]);
}
