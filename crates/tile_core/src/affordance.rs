//! Per-player control state for the multiroom feature.

use serde::{Deserialize, Serialize};
use shared::domain::{EntityId, HassSnapshot};
use thiserror::Error;

use crate::topology::{ResolvedPlayer, Topology};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSelection {
    Link,
    Unlink,
}

impl LinkSelection {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkSelection::Link => "link",
            LinkSelection::Unlink => "unlink",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown link selection '{0}', expected 'link' or 'unlink'")]
pub struct UnknownLinkSelection(pub String);

impl std::str::FromStr for LinkSelection {
    type Err = UnknownLinkSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(LinkSelection::Link),
            "unlink" => Ok(LinkSelection::Unlink),
            other => Err(UnknownLinkSelection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkOption {
    pub value: LinkSelection,
    pub icon: &'static str,
}

pub const LINK_OPTIONS: [LinkOption; 2] = [
    LinkOption {
        value: LinkSelection::Link,
        icon: "mdi:link",
    },
    LinkOption {
        value: LinkSelection::Unlink,
        icon: "mdi:link-off",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAffordance {
    pub entity_id: EntityId,
    pub power_checked: bool,
    pub link_selection: LinkSelection,
    pub link_control_disabled: bool,
    /// Join target for this player's link control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "icon", rename_all = "snake_case")]
pub enum IconSource {
    Area(String),
    /// Host draws the icon from the entity's own state.
    EntityState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub affordance: PlayerAffordance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub icon: IconSource,
    pub link_options: &'static [LinkOption],
}

pub fn player_affordance(
    player: &ResolvedPlayer,
    leader: Option<&EntityId>,
    snapshot: &HassSnapshot,
) -> PlayerAffordance {
    // A player without a state is not "off", so its toggle reads as on.
    let power_checked = snapshot
        .state(player.entity_id())
        .map_or(true, |state| !state.is_off());

    PlayerAffordance {
        entity_id: player.entity_id().clone(),
        power_checked,
        link_selection: if player.is_group_member() {
            LinkSelection::Link
        } else {
            LinkSelection::Unlink
        },
        link_control_disabled: player.is_group_leader() || leader.is_none(),
        leader: leader.cloned(),
    }
}

pub fn compute_affordances(topology: &Topology, snapshot: &HassSnapshot) -> Vec<PlayerAffordance> {
    let leader = topology.leader().map(ResolvedPlayer::entity_id);
    topology
        .players
        .iter()
        .map(|player| player_affordance(player, leader, snapshot))
        .collect()
}

pub fn icon_source(player: &ResolvedPlayer, snapshot: &HassSnapshot, use_area_icons: bool) -> IconSource {
    if !use_area_icons {
        return IconSource::EntityState;
    }
    let device = snapshot.device_for(&player.entry);
    snapshot
        .area_for(&player.entry, device)
        .and_then(|area| area.icon.clone())
        .map_or(IconSource::EntityState, IconSource::Area)
}

pub fn build_player_views(
    topology: &Topology,
    snapshot: &HassSnapshot,
    use_area_icons: bool,
) -> Vec<PlayerView> {
    topology
        .players
        .iter()
        .zip(compute_affordances(topology, snapshot))
        .map(|(player, affordance)| PlayerView {
            affordance,
            name: player.entry.name.clone(),
            icon: icon_source(player, snapshot, use_area_icons),
            link_options: &LINK_OPTIONS,
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/affordance_tests.rs"]
mod tests;
