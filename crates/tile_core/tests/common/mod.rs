#![allow(dead_code)]

use std::cell::RefCell;

use serde_json::json;
use shared::{
    domain::{EntityId, EntityRegistryEntry, EntityState, HassSnapshot},
    protocol::ServiceCall,
};
use tile_core::ServiceCaller;

pub const GROUP: &str = "media_player.living_group";
pub const KITCHEN: &str = "media_player.kitchen";
pub const BATH: &str = "media_player.bath";

#[derive(Default)]
pub struct RecordingCaller {
    pub calls: RefCell<Vec<ServiceCall>>,
}

impl ServiceCaller for RecordingCaller {
    fn call_service(&self, call: ServiceCall) {
        self.calls.borrow_mut().push(call);
    }
}

pub fn group_state(player_ids: &[&str]) -> EntityState {
    EntityState::new(GROUP, "playing")
        .with_attribute("mass_player_type", "sync_group")
        .with_attribute("group_members", json!(player_ids))
}

pub fn player_state(
    entity_id: &str,
    player_id: &str,
    group_members: &[&str],
    group_leader: Option<&str>,
) -> EntityState {
    let state = EntityState::new(entity_id, "playing")
        .with_attribute("mass_player_id", player_id)
        .with_attribute("group_members", json!(group_members));
    match group_leader {
        Some(leader) => state.with_attribute("group_leader", leader),
        None => state,
    }
}

pub fn register(snapshot: &mut HassSnapshot, state: EntityState) {
    snapshot.insert_entity(EntityRegistryEntry::new(state.entity_id.clone()));
    snapshot.insert_state(state);
}

/// Kitchen (`p1`) leads, bath (`p2`) follows.
pub fn kitchen_and_bath() -> (EntityState, HassSnapshot) {
    let mut snapshot = HassSnapshot::default();
    register(
        &mut snapshot,
        player_state(KITCHEN, "p1", &["speaker.a", "speaker.b"], None),
    );
    register(
        &mut snapshot,
        player_state(BATH, "p2", &["speaker.a", "speaker.b"], Some(KITCHEN)),
    );
    (group_state(&["p1", "p2"]), snapshot)
}

pub fn id(raw: &str) -> EntityId {
    EntityId::from(raw)
}
