//! Tile features for a home-automation dashboard: a multiroom speaker group
//! control and a consumable gauge.

pub mod affordance;
pub mod consumable;
pub mod dispatch;
pub mod feature;
pub mod multiroom;
pub mod topology;

pub use affordance::{
    build_player_views, compute_affordances, IconSource, LinkOption, LinkSelection,
    PlayerAffordance, PlayerView, LINK_OPTIONS,
};
pub use consumable::{ConsumableFeature, GaugeLevel, GaugeView};
pub use dispatch::{command_for, dispatch_gesture, Gesture, ServiceCaller};
pub use feature::{descriptor, supported_features, FeatureDescriptor, FEATURES};
pub use multiroom::MultiroomFeature;
pub use topology::{build_topology, classify, GroupRole, ResolvedPlayer, Topology};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
