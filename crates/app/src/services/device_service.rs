//! Device service: the host's registry of device descriptors.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thermohub_domain::device::{Device, DeviceIdentifier};
use thermohub_domain::error::{NotFoundError, ThermoHubError};

/// In-memory device registry keyed by [`DeviceIdentifier`].
#[derive(Default)]
pub struct DeviceService {
    devices: Mutex<HashMap<DeviceIdentifier, Device>>,
}

impl DeviceService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a device descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::Validation`] if invariants fail.
    #[tracing::instrument(skip(self, device), fields(device = %device.identifier))]
    pub fn upsert_device(&self, device: Device) -> Result<Device, ThermoHubError> {
        device.validate()?;
        let previous = self
            .lock()
            .insert(device.identifier.clone(), device.clone());
        if previous.is_none() {
            tracing::debug!(name = %device.name, "device registered");
        }
        Ok(device)
    }

    /// Look up a device by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::NotFound`] when nothing is registered under
    /// `identifier`.
    pub fn get_device(&self, identifier: &DeviceIdentifier) -> Result<Device, ThermoHubError> {
        self.lock().get(identifier).cloned().ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: identifier.to_string(),
            }
            .into()
        })
    }

    /// List all devices, ordered by name.
    #[must_use]
    pub fn list_devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.lock().values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DeviceIdentifier, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
