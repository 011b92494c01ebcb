//! Group topology derivation: which players belong to a sync group and who
//! leads it, recomputed from scratch for every snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;
use shared::domain::{EntityId, EntityRegistryEntry, EntityState, HassSnapshot};
use tracing::{debug, warn};

/// Internal id the music-assistant integration stamps on every player.
pub const PLAYER_ID_ATTR: &str = "mass_player_id";
pub const GROUP_MEMBERS_ATTR: &str = "group_members";
/// Only followers carry this back-reference; leaders never do.
pub const GROUP_LEADER_ATTR: &str = "group_leader";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Leader,
    Follower,
    Ungrouped,
}

impl GroupRole {
    pub fn is_member(self) -> bool {
        !matches!(self, GroupRole::Ungrouped)
    }

    pub fn is_leader(self) -> bool {
        matches!(self, GroupRole::Leader)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPlayer {
    #[serde(flatten)]
    pub entry: EntityRegistryEntry,
    pub role: GroupRole,
}

impl ResolvedPlayer {
    pub fn entity_id(&self) -> &EntityId {
        &self.entry.entity_id
    }

    pub fn is_group_member(&self) -> bool {
        self.role.is_member()
    }

    pub fn is_group_leader(&self) -> bool {
        self.role.is_leader()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub players: Vec<ResolvedPlayer>,
}

impl Topology {
    pub fn leader(&self) -> Option<&ResolvedPlayer> {
        self.players.iter().find(|player| player.is_group_leader())
    }

    pub fn player(&self, entity_id: &EntityId) -> Option<&ResolvedPlayer> {
        self.players
            .iter()
            .find(|player| player.entity_id() == entity_id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// String entries of `group_members`, in order. Missing, null or
/// non-array attributes read as an empty group.
pub fn group_member_ids(state: &EntityState) -> Vec<&str> {
    state
        .attribute(GROUP_MEMBERS_ATTR)
        .and_then(Value::as_array)
        .map(|members| members.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn player_id(state: &EntityState) -> Option<&str> {
    state
        .attribute_str(PLAYER_ID_ATTR)
        .filter(|player_id| !player_id.is_empty())
}

/// Maps player ids to the entities that own them, keeping input order and
/// dropping ids nothing owns. When several entities claim the same player id
/// the first in entity-id order wins.
pub fn correlate_player_ids(
    player_ids: &[&str],
    states: &BTreeMap<EntityId, EntityState>,
) -> Vec<EntityId> {
    player_ids
        .iter()
        .filter_map(|target| {
            let mut owners = states
                .iter()
                .filter(|(_, state)| player_id(state) == Some(*target))
                .map(|(entity_id, _)| entity_id);

            let Some(first) = owners.next() else {
                debug!(player_id = %target, "multiroom: player id has no owning entity");
                return None;
            };

            let extra: Vec<&EntityId> = owners.collect();
            if !extra.is_empty() {
                warn!(
                    player_id = %target,
                    chosen = %first,
                    ignored = ?extra,
                    "multiroom: player id claimed by several entities"
                );
            }

            Some(first.clone())
        })
        .collect()
}

/// Registry entries for the ids that are neither disabled nor hidden.
/// Unregistered ids are dropped as well.
pub fn filter_eligible<'a>(
    entity_ids: &[EntityId],
    entities: &'a BTreeMap<EntityId, EntityRegistryEntry>,
) -> Vec<&'a EntityRegistryEntry> {
    entity_ids
        .iter()
        .filter_map(|entity_id| {
            let Some(entry) = entities.get(entity_id) else {
                debug!(entity_id = %entity_id, "multiroom: entity not in registry");
                return None;
            };
            if !entry.is_eligible() {
                debug!(
                    entity_id = %entity_id,
                    disabled_by = ?entry.disabled_by,
                    hidden_by = ?entry.hidden_by,
                    "multiroom: skipping disabled or hidden entity"
                );
                return None;
            }
            Some(entry)
        })
        .collect()
}

/// Membership counts every `group_members` entry, not only string ids.
fn has_group_members(state: &EntityState) -> bool {
    state
        .attribute(GROUP_MEMBERS_ATTR)
        .and_then(Value::as_array)
        .is_some_and(|members| !members.is_empty())
}

/// Empty strings and `false` read as no back-reference at all.
fn has_leader_reference(state: &EntityState) -> bool {
    state.attribute(GROUP_LEADER_ATTR).is_some_and(|leader| {
        !matches!(leader, Value::Bool(false)) && leader.as_str() != Some("")
    })
}

pub fn classify(state: &EntityState) -> GroupRole {
    if !has_group_members(state) {
        GroupRole::Ungrouped
    } else if has_leader_reference(state) {
        GroupRole::Follower
    } else {
        GroupRole::Leader
    }
}

/// Resolves the players of one group entity. A player listed twice resolves
/// once, at its first position. Should a snapshot claim more than one leader,
/// the first in `group_members` order keeps the role and the rest are treated
/// as followers.
pub fn build_topology(group: &EntityState, snapshot: &HassSnapshot) -> Topology {
    let member_ids = group_member_ids(group);
    if member_ids.is_empty() {
        return Topology::default();
    }

    let mut correlated = correlate_player_ids(&member_ids, &snapshot.states);
    let mut seen = BTreeSet::new();
    correlated.retain(|entity_id| seen.insert(entity_id.clone()));

    let mut leader: Option<&EntityId> = None;

    let players = filter_eligible(&correlated, &snapshot.entities)
        .into_iter()
        .filter_map(|entry| {
            let state = snapshot.state(&entry.entity_id)?;
            let mut role = classify(state);
            if role.is_leader() {
                match leader {
                    None => leader = Some(&entry.entity_id),
                    Some(current) => {
                        warn!(
                            group = %group.entity_id,
                            leader = %current,
                            demoted = %entry.entity_id,
                            "multiroom: group reports more than one leader"
                        );
                        role = GroupRole::Follower;
                    }
                }
            }
            Some(ResolvedPlayer {
                entry: entry.clone(),
                role,
            })
        })
        .collect();

    Topology { players }
}

#[cfg(test)]
#[path = "tests/topology_tests.rs"]
mod tests;
