use serde::Serialize;
use serde_json::Value;
use shared::{
    domain::{EntityId, EntityState, HassSnapshot},
    error::FeatureError,
    protocol::{ButtonCommand, ServiceCall},
};
use tracing::{debug, warn};

use crate::{
    dispatch::ServiceCaller,
    feature::{parse_consumable_config, supports_consumable, ConsumableConfig},
};

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;
const WARNING_RATIO: f64 = 0.3;
const ERROR_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeLevel {
    Normal,
    Warning,
    Error,
}

impl GaugeLevel {
    /// Thresholds scale with the maximum only, not the configured minimum.
    pub fn for_value(value: f64, max: f64) -> Self {
        if value < max * ERROR_RATIO {
            GaugeLevel::Error
        } else if value < max * WARNING_RATIO {
            GaugeLevel::Warning
        } else {
            GaugeLevel::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeView {
    pub title: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub level: GaugeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_entity: Option<EntityId>,
    pub reset_disabled: bool,
}

/// Remaining-life gauge for a consumable part, with a reset button.
#[derive(Debug, Clone, Default)]
pub struct ConsumableFeature {
    config: Option<ConsumableConfig>,
}

impl ConsumableFeature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_config(&mut self, raw: Option<&Value>) -> Result<(), FeatureError> {
        match parse_consumable_config(raw) {
            Ok(config) => {
                self.config = Some(config);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "consumable: rejecting configuration");
                Err(error)
            }
        }
    }

    pub fn config(&self) -> Option<&ConsumableConfig> {
        self.config.as_ref()
    }

    pub fn render(&self, entity: &EntityState, snapshot: &HassSnapshot) -> Option<GaugeView> {
        let settings = &self.config.as_ref()?.config;
        if !supports_consumable(entity) {
            debug!(entity_id = %entity.entity_id, "consumable: unsupported entity");
            return None;
        }

        let Some(sensor) = snapshot.state(&settings.sensor_entity) else {
            debug!(sensor = %settings.sensor_entity, "consumable: sensor has no state");
            return None;
        };
        let Some(value) = sensor.state.trim().parse::<f64>().ok().filter(|v| v.is_finite())
        else {
            debug!(
                sensor = %settings.sensor_entity,
                state = %sensor.state,
                "consumable: sensor state is not numeric"
            );
            return None;
        };

        // A configured zero falls back to the default bound.
        let min = settings.min_value.filter(|v| *v != 0.0).unwrap_or(DEFAULT_MIN);
        let max = settings.max_value.filter(|v| *v != 0.0).unwrap_or(DEFAULT_MAX);

        Some(GaugeView {
            title: settings.title.clone(),
            value,
            min,
            max,
            level: GaugeLevel::for_value(value, max),
            reset_entity: settings.reset_entity.clone(),
            reset_disabled: settings.reset_entity.is_none(),
        })
    }

    pub fn reset_command(&self) -> Option<ServiceCall> {
        let entity_id = self.config.as_ref()?.config.reset_entity.clone()?;
        Some(ButtonCommand::Press { entity_id }.into())
    }

    /// Returns whether a call was issued.
    pub fn press_reset<C: ServiceCaller + ?Sized>(&self, caller: &C) -> bool {
        match self.reset_command() {
            Some(call) => {
                caller.call_service(call);
                true
            }
            None => {
                debug!("consumable: reset pressed without a reset entity");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/consumable_tests.rs"]
mod tests;
