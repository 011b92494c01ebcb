//! Tile feature descriptors and configuration parsing.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{
    domain::{EntityId, EntityState},
    error::FeatureError,
};

const CUSTOM_PREFIX: &str = "custom:";

pub const MULTIROOM_TYPE: &str = "multiroom-tile-feature";
pub const CONSUMABLE_TYPE: &str = "consumable-feature";

pub const MASS_PLAYER_TYPE_ATTR: &str = "mass_player_type";
pub const SYNC_GROUP_PLAYER_TYPE: &str = "sync_group";

#[derive(Debug, Clone, Copy)]
pub struct FeatureDescriptor {
    pub type_name: &'static str,
    pub name: &'static str,
    pub configurable: bool,
    pub supported: fn(&EntityState) -> bool,
}

impl FeatureDescriptor {
    /// The `type` value a card configuration uses for this feature.
    pub fn config_type(&self) -> String {
        format!("{CUSTOM_PREFIX}{}", self.type_name)
    }

    pub fn supports(&self, state: &EntityState) -> bool {
        (self.supported)(state)
    }
}

pub fn supports_multiroom(state: &EntityState) -> bool {
    state.domain() == "media_player"
        && state.attribute_str(MASS_PLAYER_TYPE_ATTR) == Some(SYNC_GROUP_PLAYER_TYPE)
}

pub fn supports_consumable(state: &EntityState) -> bool {
    state.domain() == "vacuum"
}

pub const FEATURES: &[FeatureDescriptor] = &[
    FeatureDescriptor {
        type_name: MULTIROOM_TYPE,
        name: "Multiroom",
        configurable: true,
        supported: supports_multiroom,
    },
    FeatureDescriptor {
        type_name: CONSUMABLE_TYPE,
        name: "Consumable",
        configurable: true,
        supported: supports_consumable,
    },
];

/// Looks a descriptor up by its bare or `custom:`-prefixed type.
pub fn descriptor(type_name: &str) -> Option<&'static FeatureDescriptor> {
    let bare = type_name.strip_prefix(CUSTOM_PREFIX).unwrap_or(type_name);
    FEATURES.iter().find(|feature| feature.type_name == bare)
}

pub fn supported_features(
    state: &EntityState,
) -> impl Iterator<Item = &'static FeatureDescriptor> + '_ {
    FEATURES.iter().filter(move |feature| feature.supports(state))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiroomConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "useAreaIcons", default)]
    pub use_area_icons: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumableSettings {
    #[serde(default)]
    pub title: String,
    pub sensor_entity: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_entity: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub config: ConsumableSettings,
}

pub fn multiroom_stub_config() -> Value {
    json!({
        "type": format!("{CUSTOM_PREFIX}{MULTIROOM_TYPE}"),
        "useAreaIcons": true,
    })
}

/// Only carries the type; the editor fills in the sensor before it renders.
pub fn consumable_stub_config() -> Value {
    json!({ "type": format!("{CUSTOM_PREFIX}{CONSUMABLE_TYPE}") })
}

trait TypedConfig {
    fn kind(&self) -> &str;
}

impl TypedConfig for MultiroomConfig {
    fn kind(&self) -> &str {
        &self.kind
    }
}

impl TypedConfig for ConsumableConfig {
    fn kind(&self) -> &str {
        &self.kind
    }
}

fn parse_config<T>(raw: Option<&Value>, type_name: &'static str) -> Result<T, FeatureError>
where
    T: DeserializeOwned + TypedConfig,
{
    let raw = raw.filter(|value| !value.is_null()).ok_or(FeatureError::MissingConfig)?;
    let config: T =
        serde_json::from_value(raw.clone()).map_err(|e| FeatureError::malformed(type_name, e))?;

    let matches = descriptor(config.kind()).is_some_and(|feature| feature.type_name == type_name);
    if !matches {
        return Err(FeatureError::WrongType {
            expected: type_name,
            actual: config.kind().to_string(),
        });
    }
    Ok(config)
}

pub fn parse_multiroom_config(raw: Option<&Value>) -> Result<MultiroomConfig, FeatureError> {
    parse_config(raw, MULTIROOM_TYPE)
}

pub fn parse_consumable_config(raw: Option<&Value>) -> Result<ConsumableConfig, FeatureError> {
    parse_config(raw, CONSUMABLE_TYPE)
}

#[cfg(test)]
#[path = "tests/feature_tests.rs"]
mod tests;
