use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::EntityId;

pub const MEDIA_PLAYER_DOMAIN: &str = "media_player";
pub const BUTTON_DOMAIN: &str = "button";

/// A fully specified `call_service` request. The dashboard host sends it and
/// nothing is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "call_service")]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    #[serde(default)]
    pub service_data: Map<String, Value>,
}

impl ServiceCall {
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            service_data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.service_data.insert(key.to_string(), value);
        self
    }

    pub fn target(&self) -> Option<&str> {
        self.service_data.get("entity_id").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum MediaPlayerCommand {
    TurnOn {
        entity_id: EntityId,
    },
    TurnOff {
        entity_id: EntityId,
    },
    Unjoin {
        entity_id: EntityId,
    },
    /// `entity_id` is the leader the members join. It stays optional because
    /// the link control, not the command, guards against a leaderless group.
    Join {
        group_members: Vec<EntityId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<EntityId>,
    },
}

impl MediaPlayerCommand {
    pub fn service(&self) -> &'static str {
        match self {
            MediaPlayerCommand::TurnOn { .. } => "turn_on",
            MediaPlayerCommand::TurnOff { .. } => "turn_off",
            MediaPlayerCommand::Unjoin { .. } => "unjoin",
            MediaPlayerCommand::Join { .. } => "join",
        }
    }
}

impl From<MediaPlayerCommand> for ServiceCall {
    fn from(value: MediaPlayerCommand) -> Self {
        let call = ServiceCall::new(MEDIA_PLAYER_DOMAIN, value.service());
        match value {
            MediaPlayerCommand::TurnOn { entity_id }
            | MediaPlayerCommand::TurnOff { entity_id }
            | MediaPlayerCommand::Unjoin { entity_id } => {
                call.with_data("entity_id", json!(entity_id))
            }
            MediaPlayerCommand::Join {
                group_members,
                entity_id,
            } => {
                let call = call.with_data("group_members", json!(group_members));
                match entity_id {
                    Some(leader) => call.with_data("entity_id", json!(leader)),
                    None => call,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ButtonCommand {
    Press { entity_id: EntityId },
}

impl From<ButtonCommand> for ServiceCall {
    fn from(value: ButtonCommand) -> Self {
        match value {
            ButtonCommand::Press { entity_id } => {
                ServiceCall::new(BUTTON_DOMAIN, "press").with_data("entity_id", json!(entity_id))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
