//! Device: a physical or simulated unit that exposes one or more entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ThermoHubError, ValidationError};
use crate::id::HubId;

/// Registry key of a device: the integration namespace plus the id the
/// integration uses for it (e.g. `("demo_thermostat", "kitchen_1")`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentifier {
    pub namespace: String,
    pub id: String,
}

impl DeviceIdentifier {
    #[must_use]
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

/// Descriptive metadata of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub identifier: DeviceIdentifier,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sw_version: Option<String>,
    /// Hub the device is reached through, if any.
    pub via_hub: Option<HubId>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::Validation`] when the name or either part
    /// of the identifier is empty.
    pub fn validate(&self) -> Result<(), ThermoHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.identifier.namespace.is_empty() || self.identifier.id.is_empty() {
            return Err(ValidationError::EmptyDeviceIdentifier.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    identifier: Option<DeviceIdentifier>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    sw_version: Option<String>,
    via_hub: Option<HubId>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn identifier(mut self, identifier: DeviceIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn sw_version(mut self, sw_version: impl Into<String>) -> Self {
        self.sw_version = Some(sw_version.into());
        self
    }

    #[must_use]
    pub fn via_hub(mut self, hub_id: HubId) -> Self {
        self.via_hub = Some(hub_id);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::Validation`] if the name or identifier is
    /// missing or empty.
    pub fn build(self) -> Result<Device, ThermoHubError> {
        let device = Device {
            identifier: self
                .identifier
                .unwrap_or_else(|| DeviceIdentifier::new("", "")),
            name: self.name.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
            sw_version: self.sw_version,
            via_hub: self.via_hub,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier() -> DeviceIdentifier {
        DeviceIdentifier::new("demo_thermostat", "kitchen_1")
    }

    #[test]
    fn should_build_valid_device_when_name_and_identifier_provided() {
        let device = Device::builder()
            .identifier(identifier())
            .name("Kitchen Thermostat 1")
            .manufacturer("Demonstration Corp")
            .model("Test Thermostat")
            .sw_version("1.0.4")
            .via_hub(HubId::new("kitchen"))
            .build()
            .unwrap();

        assert_eq!(device.name, "Kitchen Thermostat 1");
        assert_eq!(device.manufacturer.as_deref(), Some("Demonstration Corp"));
        assert_eq!(device.via_hub, Some(HubId::new("kitchen")));
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Device::builder().identifier(identifier()).build();
        assert!(matches!(
            result,
            Err(ThermoHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_identifier_is_missing() {
        let result = Device::builder().name("Orphan").build();
        assert!(matches!(
            result,
            Err(ThermoHubError::Validation(
                ValidationError::EmptyDeviceIdentifier
            ))
        ));
    }

    #[test]
    fn should_display_identifier_as_namespace_and_id() {
        assert_eq!(identifier().to_string(), "demo_thermostat:kitchen_1");
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let device = Device::builder()
            .identifier(identifier())
            .name("Kitchen Thermostat 1")
            .build()
            .unwrap();
        let json = serde_json::to_string(&device).unwrap();
        let parsed: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, device);
    }
}
