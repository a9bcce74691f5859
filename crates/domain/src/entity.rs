//! Entity: the central state-holding concept.
//!
//! An entity represents a single observable aspect of a device, such as the
//! temperature reported by a thermostat. Entities are snapshots: adapters
//! build a fresh one every time the underlying device changes and hand it to
//! the host.

mod attribute_value;
mod state;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use crate::device::DeviceIdentifier;
use crate::error::{ThermoHubError, ValidationError};
use crate::id::EntityId;
use crate::time::{Timestamp, now};

/// Attribute key for the unit a measurement is expressed in.
pub const ATTR_UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";
/// Attribute key for the kind of quantity measured.
pub const ATTR_DEVICE_CLASS: &str = "device_class";

/// A state holder with a stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device: Option<DeviceIdentifier>,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::Validation`] when the id or the friendly
    /// name is empty.
    pub fn validate(&self) -> Result<(), ThermoHubError> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Record a new state. `last_changed` only moves when the state differs.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
        self.last_updated = at;
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device: Option<DeviceIdentifier>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: BTreeMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device(mut self, device: DeviceIdentifier) -> Self {
        self.device = Some(device);
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Consume the builder, validate, and return an [`Entity`] stamped with
    /// the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::Validation`] if the id or friendly name is
    /// missing or empty.
    pub fn build(self) -> Result<Entity, ThermoHubError> {
        let ts = now();
        let entity = Entity {
            id: self.id.unwrap_or_else(|| EntityId::new("")),
            device: self.device,
            friendly_name: self.friendly_name.unwrap_or_default(),
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}
