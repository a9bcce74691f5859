//! Concrete [`IntegrationContext`] backed by application services.

use std::sync::Arc;

use thermohub_domain::device::Device;
use thermohub_domain::entity::Entity;
use thermohub_domain::error::ThermoHubError;
use thermohub_domain::event::Event;

use crate::ports::{EventPublisher, IntegrationContext};
use crate::services::device_service::DeviceService;
use crate::services::entity_service::EntityService;

/// [`IntegrationContext`] implementation that delegates to `DeviceService`,
/// `EntityService`, and an `EventPublisher`.
///
/// Wraps `Arc`-ed services so it is cheaply cloneable and `Send + Sync`;
/// integrations capture clones of it inside device observer callbacks.
pub struct ServiceContext<EP> {
    device_service: Arc<DeviceService>,
    entity_service: Arc<EntityService<EP>>,
    event_publisher: EP,
}

impl<EP> ServiceContext<EP> {
    /// Create a new context backed by the given services and event publisher.
    pub fn new(
        device_service: Arc<DeviceService>,
        entity_service: Arc<EntityService<EP>>,
        event_publisher: EP,
    ) -> Self {
        Self {
            device_service,
            entity_service,
            event_publisher,
        }
    }
}

impl<EP: Clone> Clone for ServiceContext<EP> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            entity_service: Arc::clone(&self.entity_service),
            event_publisher: self.event_publisher.clone(),
        }
    }
}

impl<EP> IntegrationContext for ServiceContext<EP>
where
    EP: EventPublisher + Send + Sync + 'static,
{
    fn upsert_device(&self, device: Device) -> Result<Device, ThermoHubError> {
        self.device_service.upsert_device(device)
    }

    fn upsert_entity(&self, entity: Entity) -> Result<Entity, ThermoHubError> {
        self.entity_service.upsert_entity(entity)
    }

    fn publish(&self, event: Event) -> Result<(), ThermoHubError> {
        self.event_publisher.publish(event)
    }
}
