mod common;

use common::{id, kitchen_and_bath, player_state, register, RecordingCaller, BATH, KITCHEN};
use serde_json::json;
use tile_core::{
    build_topology, compute_affordances, dispatch_gesture, feature::multiroom_stub_config,
    Gesture, GroupRole, LinkSelection, MultiroomFeature,
};

#[test]
fn leader_and_follower_resolve_from_player_ids() {
    let (group, snapshot) = kitchen_and_bath();

    let topology = build_topology(&group, &snapshot);
    assert_eq!(topology.players.len(), 2);
    assert_eq!(topology.players[0].role, GroupRole::Leader);
    assert_eq!(topology.players[1].role, GroupRole::Follower);

    let bath = &compute_affordances(&topology, &snapshot)[1];
    assert_eq!(bath.entity_id, id(BATH));
    assert_eq!(bath.link_selection, LinkSelection::Link);
    assert!(!bath.link_control_disabled);
}

#[test]
fn disabled_leader_leaves_follower_without_link_target() {
    let (group, mut snapshot) = kitchen_and_bath();
    if let Some(entry) = snapshot.entities.get_mut(&id(KITCHEN)) {
        entry.disabled_by = Some("user".into());
    }

    let topology = build_topology(&group, &snapshot);
    assert_eq!(topology.players.len(), 1);
    assert_eq!(topology.players[0].entry.entity_id, id(BATH));

    let affordances = compute_affordances(&topology, &snapshot);
    assert!(affordances[0].leader.is_none());
    assert!(affordances[0].link_control_disabled);
}

#[test]
fn power_off_issues_single_turn_off() {
    let (group, snapshot) = kitchen_and_bath();
    let caller = RecordingCaller::default();
    let affordances = compute_affordances(&build_topology(&group, &snapshot), &snapshot);

    dispatch_gesture(&caller, Gesture::PowerToggled { checked: false }, &affordances[1]);

    let calls = caller.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].domain, "media_player");
    assert_eq!(calls[0].service, "turn_off");
    assert_eq!(calls[0].service_data, *json!({ "entity_id": BATH }).as_object().expect("object"));
}

#[test]
fn unlink_member_issues_single_unjoin() {
    let (group, snapshot) = kitchen_and_bath();
    let caller = RecordingCaller::default();
    let affordances = compute_affordances(&build_topology(&group, &snapshot), &snapshot);

    dispatch_gesture(&caller, Gesture::LinkSelected(LinkSelection::Unlink), &affordances[1]);

    let calls = caller.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].service, "unjoin");
    assert_eq!(calls[0].target(), Some(BATH));
}

#[test]
fn link_outsider_issues_single_join_to_leader() {
    let (_, mut snapshot) = kitchen_and_bath();
    register(
        &mut snapshot,
        player_state("media_player.office", "p3", &[], None),
    );
    let group = common::group_state(&["p1", "p2", "p3"]);

    let mut feature = MultiroomFeature::new();
    feature
        .set_config(Some(&multiroom_stub_config()))
        .expect("config");
    let caller = RecordingCaller::default();

    assert!(feature.handle(
        &caller,
        &group,
        &snapshot,
        &id("media_player.office"),
        Gesture::LinkSelected(LinkSelection::Link),
    ));

    let calls = caller.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].service, "join");
    assert_eq!(calls[0].target(), Some(KITCHEN));
    assert_eq!(
        calls[0].service_data["group_members"],
        json!(["media_player.office"])
    );
}
