use serde_json::Value;
use shared::{
    domain::{EntityId, EntityState, HassSnapshot},
    error::FeatureError,
};
use tracing::{debug, warn};

use crate::{
    affordance::{build_player_views, compute_affordances, PlayerAffordance, PlayerView},
    dispatch::{dispatch_gesture, Gesture, ServiceCaller},
    feature::{parse_multiroom_config, supports_multiroom, MultiroomConfig},
    topology::{build_topology, Topology},
};

/// Multiroom speaker group control. Holds only its configuration; every
/// render derives the topology again from the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct MultiroomFeature {
    config: Option<MultiroomConfig>,
}

impl MultiroomFeature {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rejected configuration leaves the previous one in place.
    pub fn set_config(&mut self, raw: Option<&Value>) -> Result<(), FeatureError> {
        match parse_multiroom_config(raw) {
            Ok(config) => {
                self.config = Some(config);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "multiroom: rejecting configuration");
                Err(error)
            }
        }
    }

    pub fn config(&self) -> Option<&MultiroomConfig> {
        self.config.as_ref()
    }

    fn topology(&self, group: &EntityState, snapshot: &HassSnapshot) -> Option<Topology> {
        if self.config.is_none() {
            debug!(group = %group.entity_id, "multiroom: not configured");
            return None;
        }
        if !supports_multiroom(group) {
            debug!(group = %group.entity_id, "multiroom: entity is not a sync group");
            return None;
        }
        Some(build_topology(group, snapshot))
    }

    /// `None` means the feature draws nothing for this entity.
    pub fn render(&self, group: &EntityState, snapshot: &HassSnapshot) -> Option<Vec<PlayerView>> {
        let use_area_icons = self.config.as_ref()?.use_area_icons;
        let topology = self.topology(group, snapshot)?;
        Some(build_player_views(&topology, snapshot, use_area_icons))
    }

    pub fn affordances(
        &self,
        group: &EntityState,
        snapshot: &HassSnapshot,
    ) -> Option<Vec<PlayerAffordance>> {
        let topology = self.topology(group, snapshot)?;
        Some(compute_affordances(&topology, snapshot))
    }

    /// Sends the command for a gesture on one of the group's players.
    /// Returns false when the player is not part of the rendered group.
    pub fn handle<C: ServiceCaller + ?Sized>(
        &self,
        caller: &C,
        group: &EntityState,
        snapshot: &HassSnapshot,
        player: &EntityId,
        gesture: Gesture,
    ) -> bool {
        let Some(affordance) = self
            .affordances(group, snapshot)
            .and_then(|all| all.into_iter().find(|a| &a.entity_id == player))
        else {
            debug!(group = %group.entity_id, %player, "multiroom: gesture on unknown player");
            return false;
        };
        dispatch_gesture(caller, gesture, &affordance);
        true
    }
}

#[cfg(test)]
#[path = "tests/multiroom_tests.rs"]
mod tests;
