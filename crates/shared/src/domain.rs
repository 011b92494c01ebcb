use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(EntityId);
id_newtype!(DeviceId);
id_newtype!(AreaId);

impl EntityId {
    /// Part of the id before the first `.`, e.g. `media_player`.
    pub fn domain(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map(|(_, rest)| rest).unwrap_or_default()
    }
}

pub const STATE_OFF: &str = "off";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: EntityId,
    pub state: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl EntityState {
    pub fn new(entity_id: impl Into<EntityId>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: serde_json::Map::new(),
            last_changed: None,
            last_updated: None,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn domain(&self) -> &str {
        self.entity_id.domain()
    }

    /// Attribute lookup that treats an explicit `null` the same as absence.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|value| !value.is_null())
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    pub fn is_off(&self) -> bool {
        self.state == STATE_OFF
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistryEntry {
    pub entity_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_by: Option<String>,
}

impl EntityRegistryEntry {
    pub fn new(entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_id: entity_id.into(),
            name: None,
            icon: None,
            platform: None,
            device_id: None,
            area_id: None,
            disabled_by: None,
            hidden_by: None,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.disabled_by.is_none() && self.hidden_by.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistryEntry {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRegistryEntry {
    pub area_id: AreaId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One render pass worth of dashboard data. Ordered maps keep every scan
/// deterministic across identical snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HassSnapshot {
    #[serde(default)]
    pub states: BTreeMap<EntityId, EntityState>,
    #[serde(default)]
    pub entities: BTreeMap<EntityId, EntityRegistryEntry>,
    #[serde(default)]
    pub devices: BTreeMap<DeviceId, DeviceRegistryEntry>,
    #[serde(default)]
    pub areas: BTreeMap<AreaId, AreaRegistryEntry>,
}

impl HassSnapshot {
    pub fn insert_state(&mut self, state: EntityState) {
        self.states.insert(state.entity_id.clone(), state);
    }

    pub fn insert_entity(&mut self, entry: EntityRegistryEntry) {
        self.entities.insert(entry.entity_id.clone(), entry);
    }

    pub fn insert_device(&mut self, device: DeviceRegistryEntry) {
        self.devices.insert(device.id.clone(), device);
    }

    pub fn insert_area(&mut self, area: AreaRegistryEntry) {
        self.areas.insert(area.area_id.clone(), area);
    }

    pub fn state(&self, entity_id: &EntityId) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    pub fn entity(&self, entity_id: &EntityId) -> Option<&EntityRegistryEntry> {
        self.entities.get(entity_id)
    }

    pub fn device_for(&self, entity: &EntityRegistryEntry) -> Option<&DeviceRegistryEntry> {
        entity
            .device_id
            .as_ref()
            .and_then(|device_id| self.devices.get(device_id))
    }

    /// The entity's own area wins; otherwise the owning device's area.
    pub fn area_for(
        &self,
        entity: &EntityRegistryEntry,
        device: Option<&DeviceRegistryEntry>,
    ) -> Option<&AreaRegistryEntry> {
        entity
            .area_id
            .as_ref()
            .or_else(|| device.and_then(|device| device.area_id.as_ref()))
            .and_then(|area_id| self.areas.get(area_id))
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
