mod common;

use common::{player_state, register};
use proptest::prelude::*;
use serde_json::json;
use shared::domain::{EntityId, EntityState, HassSnapshot};
use tile_core::{build_topology, compute_affordances, GroupRole};

#[derive(Clone, Debug)]
struct ArbPlayer {
    grouped: bool,
    follower: bool,
    disabled: bool,
    hidden: bool,
    registered: bool,
}

fn arb_player() -> impl Strategy<Value = ArbPlayer> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.9),
    )
        .prop_map(|(grouped, follower, disabled, hidden, registered)| ArbPlayer {
            grouped,
            follower,
            disabled,
            hidden,
            registered,
        })
}

fn arb_world() -> impl Strategy<Value = (EntityState, HassSnapshot)> {
    (
        prop::collection::vec(arb_player(), 0..8),
        prop::collection::vec(0usize..10, 0..10),
    )
        .prop_map(|(players, picks)| {
            let mut snapshot = HassSnapshot::default();
            for (index, player) in players.iter().enumerate() {
                let entity_id = format!("media_player.speaker_{index}");
                let members: &[&str] = if player.grouped { &["x", "y"] } else { &[] };
                let leader = player.follower.then_some("media_player.speaker_0");
                let state = player_state(&entity_id, &format!("p{index}"), members, leader);
                if player.registered {
                    register(&mut snapshot, state);
                    if let Some(entry) = snapshot.entities.get_mut(&EntityId::from(entity_id.as_str())) {
                        entry.disabled_by = player.disabled.then(|| "user".to_string());
                        entry.hidden_by = player.hidden.then(|| "user".to_string());
                    }
                } else {
                    snapshot.insert_state(state);
                }
            }
            let ids: Vec<String> = picks.iter().map(|pick| format!("p{pick}")).collect();
            let group = EntityState::new("media_player.group", "playing")
                .with_attribute("mass_player_type", "sync_group")
                .with_attribute("group_members", json!(ids));
            (group, snapshot)
        })
}

proptest! {
    #[test]
    fn at_most_one_leader((group, snapshot) in arb_world()) {
        let topology = build_topology(&group, &snapshot);
        let leaders = topology.players.iter().filter(|p| p.is_group_leader()).count();
        prop_assert!(leaders <= 1);
    }

    #[test]
    fn leaders_are_always_members((group, snapshot) in arb_world()) {
        let topology = build_topology(&group, &snapshot);
        for player in &topology.players {
            prop_assert!(!player.is_group_leader() || player.is_group_member());
            prop_assert!(player.entry.is_eligible());
        }
    }

    #[test]
    fn rebuilding_same_snapshot_is_identical((group, snapshot) in arb_world()) {
        let first = build_topology(&group, &snapshot);
        let second = build_topology(&group, &snapshot);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            compute_affordances(&first, &snapshot),
            compute_affordances(&second, &snapshot)
        );
    }

    #[test]
    fn leaderless_groups_lock_every_link_control((group, snapshot) in arb_world()) {
        let topology = build_topology(&group, &snapshot);
        if topology.leader().is_none() {
            for affordance in compute_affordances(&topology, &snapshot) {
                prop_assert!(affordance.link_control_disabled);
            }
        }
    }

    #[test]
    fn disabling_a_player_keeps_other_roles(
        (group, snapshot) in arb_world(),
        victim in any::<prop::sample::Index>(),
    ) {
        let before = build_topology(&group, &snapshot);
        // Demotion only applies to malformed snapshots with several leaders.
        let raw_leaders = before
            .players
            .iter()
            .filter(|p| tile_core::classify(&snapshot.states[p.entity_id()]) == GroupRole::Leader)
            .count();
        if before.is_empty() || raw_leaders > 1 {
            return Ok(());
        }

        let removed = before.players[victim.index(before.players.len())].entity_id().clone();
        let mut reduced = snapshot.clone();
        if let Some(entry) = reduced.entities.get_mut(&removed) {
            entry.disabled_by = Some("user".into());
        }

        let after = build_topology(&group, &reduced);
        for player in &after.players {
            let previous = before.player(player.entity_id()).map(|p| p.role);
            prop_assert_eq!(previous, Some(player.role));
        }
        prop_assert!(after.player(&removed).is_none());
    }

    #[test]
    fn each_entity_resolves_once((group, snapshot) in arb_world()) {
        let topology = build_topology(&group, &snapshot);
        let mut ids: Vec<_> = topology.players.iter().map(|p| p.entity_id().clone()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }
}
