//! Temperature sensor: maps a thermostat onto a host entity.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thermohub_app::ports::IntegrationContext;
use thermohub_domain::device::{Device, DeviceIdentifier};
use thermohub_domain::entity::{ATTR_DEVICE_CLASS, ATTR_UNIT_OF_MEASUREMENT, Entity, EntityState};
use thermohub_domain::error::ThermoHubError;
use thermohub_domain::id::EntityId;

use crate::DOMAIN;
use crate::observer::Observer;
use crate::thermostat::Thermostat;

pub const UNIT_CELSIUS: &str = "°C";
pub const DEVICE_CLASS_TEMPERATURE: &str = "temperature";
/// Attribute key exposing the thermostat's target temperature.
pub const ATTR_TARGET_TEMPERATURE: &str = "target_temperature";

/// Host-facing view of one thermostat's current temperature.
pub struct TemperatureSensor {
    thermostat: Thermostat,
    unique_id: EntityId,
    observer: Mutex<Option<Observer>>,
}

impl TemperatureSensor {
    #[must_use]
    pub fn new(thermostat: Thermostat) -> Self {
        Self {
            unique_id: unique_id(&thermostat),
            thermostat,
            observer: Mutex::new(None),
        }
    }

    /// `{thermostat_id}_temperature`
    #[must_use]
    pub fn unique_id(&self) -> &EntityId {
        &self.unique_id
    }

    #[must_use]
    pub fn name(&self) -> String {
        friendly_name(&self.thermostat)
    }

    #[must_use]
    pub fn thermostat(&self) -> &Thermostat {
        &self.thermostat
    }

    #[must_use]
    pub fn device_identifier(&self) -> DeviceIdentifier {
        DeviceIdentifier::new(DOMAIN, self.thermostat.id().as_str())
    }

    /// Samples the thermostat, so two consecutive calls may disagree.
    #[must_use]
    pub fn available(&self) -> bool {
        self.thermostat.is_available()
    }

    /// Device descriptor for the host registry.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the thermostat has an empty name.
    pub fn device(&self) -> Result<Device, ThermoHubError> {
        let mut builder = Device::builder()
            .identifier(self.device_identifier())
            .name(self.thermostat.name())
            .model(self.thermostat.model())
            .sw_version(self.thermostat.firmware_version());
        if let Some(hub) = self.thermostat.hub() {
            builder = builder
                .manufacturer(hub.manufacturer())
                .via_hub(hub.hub_id().clone());
        }
        builder.build()
    }

    /// Current entity snapshot.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the thermostat has an empty name.
    pub fn entity(&self) -> Result<Entity, ThermoHubError> {
        snapshot(&self.thermostat)
    }

    /// Start pushing a fresh snapshot to `ctx` on every thermostat change.
    ///
    /// Returns `false` if the sensor was already attached.
    pub fn attach(&self, ctx: impl IntegrationContext + 'static) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }

        let thermostat = self.thermostat.clone();
        let observer = Observer::new(move || match snapshot(&thermostat) {
            Ok(entity) => {
                if let Err(err) = ctx.upsert_entity(entity) {
                    tracing::warn!(thermostat = %thermostat.id(), error = %err, "failed to write sensor state");
                }
            }
            Err(err) => {
                tracing::warn!(thermostat = %thermostat.id(), error = %err, "failed to build sensor state");
            }
        });
        self.thermostat.register_observer(observer.clone());
        *slot = Some(observer);
        tracing::debug!(entity_id = %self.unique_id, "sensor attached");
        true
    }

    /// Stop pushing updates. Returns `false` if the sensor was not attached.
    pub fn detach(&self) -> bool {
        let Some(observer) = self.lock().take() else {
            return false;
        };
        self.thermostat.remove_observer(&observer);
        tracing::debug!(entity_id = %self.unique_id, "sensor detached");
        true
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Observer>> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TemperatureSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemperatureSensor")
            .field("unique_id", &self.unique_id)
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

fn unique_id(thermostat: &Thermostat) -> EntityId {
    EntityId::new(format!("{}_temperature", thermostat.id()))
}

fn friendly_name(thermostat: &Thermostat) -> String {
    format!("{} Temperature", thermostat.name())
}

fn snapshot(thermostat: &Thermostat) -> Result<Entity, ThermoHubError> {
    let temps = thermostat.temperatures();
    let state = if thermostat.is_available() {
        EntityState::Measurement(i64::from(temps.current))
    } else {
        EntityState::Unavailable
    };
    Entity::builder()
        .id(unique_id(thermostat))
        .device(DeviceIdentifier::new(DOMAIN, thermostat.id().as_str()))
        .friendly_name(friendly_name(thermostat))
        .state(state)
        .attribute(ATTR_UNIT_OF_MEASUREMENT, UNIT_CELSIUS)
        .attribute(ATTR_DEVICE_CLASS, DEVICE_CLASS_TEMPERATURE)
        .attribute(ATTR_TARGET_TEMPERATURE, i64::from(temps.target))
        .build()
}
