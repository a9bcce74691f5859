//! Integration port: lifecycle and service-call handling for device integrations.
//!
//! An integration bridges a device family (here: simulated thermostats behind
//! a hub) into the thermohub host. It discovers devices/entities on setup,
//! pushes fresh entity snapshots whenever a device changes, and handles
//! service calls directed at entities it owns.

use std::future::Future;

use thermohub_domain::device::Device;
use thermohub_domain::entity::Entity;
use thermohub_domain::error::ThermoHubError;
use thermohub_domain::event::Event;
use thermohub_domain::id::EntityId;

/// Context provided to integrations for handing over discoveries and state.
///
/// This is a **port**: adapters call it from device observer callbacks, so
/// every method is synchronous and must not block for long. The app crate
/// provides [`ServiceContext`](crate::services::integration_context::ServiceContext)
/// backed by `DeviceService` and `EntityService`.
pub trait IntegrationContext: Send + Sync {
    /// Register or refresh a device descriptor (keyed by its identifier).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the descriptor breaks domain invariants.
    fn upsert_device(&self, device: Device) -> Result<Device, ThermoHubError>;

    /// Register an entity or write a new snapshot of its state.
    ///
    /// Also publishes `EntityRegistered` / `StateChanged` events through the
    /// event bus when appropriate.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the snapshot breaks domain invariants.
    fn upsert_entity(&self, entity: Entity) -> Result<Entity, ThermoHubError>;

    /// Publish a domain event to the event bus.
    ///
    /// # Errors
    ///
    /// Propagates publisher failures.
    fn publish(&self, event: Event) -> Result<(), ThermoHubError>;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    ///
    /// # Errors
    ///
    /// Stops at the first descriptor or snapshot that fails validation.
    fn persist_discovered(&self, dd: DiscoveredDevice) -> Result<(), ThermoHubError> {
        self.upsert_device(dd.device)?;
        for entity in dd.entities {
            self.upsert_entity(entity)?;
        }
        Ok(())
    }
}

/// A pluggable device integration.
///
/// The host calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): build the devices and return what was discovered
/// 2. [`start_background`](Self::start_background): subscribe to device changes
/// 3. (the host runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown): unsubscribe and release resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"demo_thermostat"`).
    fn name(&self) -> &'static str;

    /// Initialise the integration and report its devices and entities.
    fn setup(
        &mut self,
    ) -> impl Future<Output = Result<Vec<DiscoveredDevice>, ThermoHubError>> + Send;

    /// Start pushing entity updates through `ctx`.
    ///
    /// The default implementation is a no-op (suitable for integrations that
    /// only report state in response to service calls).
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), ThermoHubError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (e.g. `set_temperature`) for an entity owned by
    /// this integration.
    ///
    /// Returns the entity snapshot right after the call was applied.
    fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, ThermoHubError>> + Send;

    /// Called on graceful shutdown. Stop pushing updates and clean up.
    fn teardown(&mut self) -> impl Future<Output = Result<(), ThermoHubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
