#![allow(clippy::float_cmp)]

use super::*;
use crate::scene::{NodeSpec, ZoneSpec};

/// Board with two side-by-side slots and a resting tile overlapping the
/// first slot.
fn slot_board(scene: &mut Scene) -> (NodeId, NodeId, NodeId, NodeId) {
    let root = scene.load_spec(
        None,
        &NodeSpec::container("Board").sized(400.0, 200.0).with_children(vec![
            NodeSpec::zone("Slot_1", ZoneSpec::quantity()).at(0.0, 0.0).sized(100.0, 100.0),
            NodeSpec::zone("Slot_2", ZoneSpec::quantity()).at(100.0, 0.0).sized(100.0, 100.0),
            NodeSpec::item("Stone_9", "stone").at(10.0, 10.0).sized(20.0, 20.0),
        ]),
    );
    let children = scene.children_of(root);
    (root, children[0], children[1], children[2])
}

// --- top_blocker_at ---

#[test]
fn empty_scene_blocks_nothing() {
    let scene = Scene::new();
    assert!(top_blocker_at(&scene, Point::new(0.0, 0.0)).is_none());
}

#[test]
fn later_sibling_wins_over_earlier() {
    let mut scene = Scene::new();
    let (_, slot1, slot2, _) = slot_board(&mut scene);
    // Exactly on the shared edge: the half-open rects give it to slot2.
    assert_eq!(top_blocker_at(&scene, Point::new(100.0, 50.0)), Some(slot2));
    assert_eq!(top_blocker_at(&scene, Point::new(99.0, 50.0)), Some(slot1));
}

#[test]
fn resting_tile_occludes_slot_beneath() {
    let mut scene = Scene::new();
    let (_, _, _, stone) = slot_board(&mut scene);
    assert_eq!(top_blocker_at(&scene, Point::new(15.0, 15.0)), Some(stone));
}

#[test]
fn non_blocking_tile_is_transparent() {
    let mut scene = Scene::new();
    let (_, slot1, _, stone) = slot_board(&mut scene);
    if let Some(node) = scene.get_mut(stone) {
        node.blocks_raycasts = false;
    }
    assert_eq!(top_blocker_at(&scene, Point::new(15.0, 15.0)), Some(slot1));
}

#[test]
fn inactive_subtree_is_skipped() {
    let mut scene = Scene::new();
    let (_, slot1, _, _) = slot_board(&mut scene);
    if let Some(node) = scene.get_mut(slot1) {
        node.active = false;
    }
    // The board rect itself still blocks underneath.
    let root_hit = top_blocker_at(&scene, Point::new(50.0, 150.0));
    assert!(root_hit.is_some());
    assert_ne!(top_blocker_at(&scene, Point::new(50.0, 50.0)), Some(slot1));
}

#[test]
fn zero_sized_node_contains_nothing() {
    let mut scene = Scene::new();
    let point = scene.load_spec(None, &NodeSpec::container("Dot").at(10.0, 10.0));
    assert_ne!(top_blocker_at(&scene, Point::new(10.0, 10.0)), Some(point));
}

#[test]
fn child_wins_over_parent() {
    let mut scene = Scene::new();
    let root = scene.load_spec(
        None,
        &NodeSpec::container("Board")
            .sized(200.0, 200.0)
            .with_children(vec![NodeSpec::zone("Slot_1", ZoneSpec::quantity()).sized(50.0, 50.0)]),
    );
    let slot = scene.children_of(root)[0];
    assert_eq!(top_blocker_at(&scene, Point::new(25.0, 25.0)), Some(slot));
}

// --- drop_target_at ---

#[test]
fn drop_target_is_zone_itself_when_hit_directly() {
    let mut scene = Scene::new();
    let (_, slot1, _, _) = slot_board(&mut scene);
    let hit = drop_target_at(&scene, Point::new(60.0, 60.0));
    assert_eq!(hit, Some(Hit { blocker: slot1, zone: slot1 }));
}

#[test]
fn drop_bubbles_from_child_to_ancestor_zone() {
    let mut scene = Scene::new();
    let root = scene.load_spec(
        None,
        &NodeSpec::zone("CountDisplay", ZoneSpec::quantity())
            .sized(300.0, 300.0)
            .with_children(vec![NodeSpec::container("Decoration").sized(40.0, 40.0)]),
    );
    let decoration = scene.children_of(root)[0];
    let hit = drop_target_at(&scene, Point::new(20.0, 20.0));
    assert_eq!(hit, Some(Hit { blocker: decoration, zone: root }));
}

#[test]
fn blocker_without_zone_ancestor_is_a_miss() {
    let mut scene = Scene::new();
    let (_, _, _, stone) = slot_board(&mut scene);
    // The stone sits over Slot_1 but is not a zone and its parent chain
    // (the plain board container) has none either.
    let hit = drop_target_at(&scene, Point::new(15.0, 15.0));
    assert_eq!(top_blocker_at(&scene, Point::new(15.0, 15.0)), Some(stone));
    assert!(hit.is_none());
}

#[test]
fn miss_outside_everything() {
    let mut scene = Scene::new();
    slot_board(&mut scene);
    assert!(drop_target_at(&scene, Point::new(-5.0, -5.0)).is_none());
}
