//! # thermohub-adapter-demo
//!
//! Demo integration simulating a hub of thermostats.
//!
//! ## Behaviour
//!
//! | Thing | Identity | Behaviour |
//! |-------|----------|-----------|
//! | Hub | `{host}` lower-cased | Owns `thermostat_count` thermostats, answers the connectivity probe after a fixed latency |
//! | Thermostat | `{hub_id}_{n}` | Target set immediately, current temperature converges after 1..=5 s |
//! | Temperature sensor | `{hub_id}_{n}_temperature` | Reports the current temperature, `unavailable` when device or hub is offline |
//!
//! Thermostats report themselves online at random (90 % by default), sampled
//! on every read.
//!
//! ## Dependency rule
//!
//! Depends on `thermohub-app` (port traits) and `thermohub-domain` only.

pub mod config;
pub mod error;
pub mod hub;
pub mod observer;
pub mod scheduler;
pub mod sensor;
pub mod thermostat;

use std::sync::Arc;

use thermohub_app::ports::integration::{DiscoveredDevice, Integration, IntegrationContext};
use thermohub_domain::entity::Entity;
use thermohub_domain::error::{ThermoHubError, ValidationError};
use thermohub_domain::id::EntityId;

pub use config::{DemoConfig, SimulationSettings};
pub use error::DemoError;
pub use hub::Hub;
pub use observer::Observer;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use sensor::TemperatureSensor;
pub use thermostat::Thermostat;

/// Namespace of every device and entity this integration registers.
pub const DOMAIN: &str = "demo_thermostat";

/// The only service thermostats accept. Payload: `{"temperature": <integer>}`.
pub const SERVICE_SET_TEMPERATURE: &str = "set_temperature";

/// Integration exposing one temperature sensor per simulated thermostat.
pub struct DemoIntegration {
    config: DemoConfig,
    scheduler: Arc<dyn Scheduler>,
    hub: Option<Arc<Hub>>,
    sensors: Vec<TemperatureSensor>,
}

impl DemoIntegration {
    #[must_use]
    pub fn new(config: DemoConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            config,
            scheduler,
            hub: None,
            sensors: Vec::new(),
        }
    }

    /// The hub built by [`setup`](Integration::setup), if it ran.
    #[must_use]
    pub fn hub(&self) -> Option<&Arc<Hub>> {
        self.hub.as_ref()
    }

    #[must_use]
    pub fn sensors(&self) -> &[TemperatureSensor] {
        &self.sensors
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: &EntityId) -> bool {
        self.sensors.iter().any(|s| s.unique_id() == entity_id)
    }

    fn sensor(&self, entity_id: &EntityId) -> Result<&TemperatureSensor, DemoError> {
        self.sensors
            .iter()
            .find(|s| s.unique_id() == entity_id)
            .ok_or_else(|| DemoError::UnknownDevice(entity_id.clone()))
    }

    fn detach_all(&self) -> usize {
        self.sensors.iter().filter(|s| s.detach()).count()
    }
}

impl Integration for DemoIntegration {
    fn name(&self) -> &'static str {
        DOMAIN
    }

    async fn setup(&mut self) -> Result<Vec<DiscoveredDevice>, ThermoHubError> {
        self.config.validate()?;
        self.detach_all();

        let hub = Hub::new(
            &self.config.host,
            &self.config.settings(),
            Arc::clone(&self.scheduler),
        );
        if !hub.test_connection().await {
            return Err(DemoError::HubUnreachable {
                hub_id: hub.hub_id().clone(),
            }
            .into());
        }

        let sensors: Vec<TemperatureSensor> = hub
            .thermostats()
            .iter()
            .cloned()
            .map(TemperatureSensor::new)
            .collect();
        let discovered = sensors
            .iter()
            .map(|sensor| {
                Ok(DiscoveredDevice {
                    device: sensor.device()?,
                    entities: vec![sensor.entity()?],
                })
            })
            .collect::<Result<Vec<_>, ThermoHubError>>()?;

        tracing::info!(hub = %hub.hub_id(), devices = discovered.len(), "demo hub ready");
        self.hub = Some(hub);
        self.sensors = sensors;
        Ok(discovered)
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), ThermoHubError> {
        if self.sensors.is_empty() {
            tracing::warn!("start_background called before setup, nothing to attach");
        }
        for sensor in &self.sensors {
            sensor.attach(ctx.clone());
        }
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, ThermoHubError> {
        let sensor = self.sensor(entity_id)?;
        if service != SERVICE_SET_TEMPERATURE {
            return Err(ValidationError::UnsupportedService(service.to_string()).into());
        }

        let target = data
            .get("temperature")
            .and_then(serde_json::Value::as_i64)
            .and_then(|t| i32::try_from(t).ok())
            .ok_or(ValidationError::InvalidField("temperature"))?;

        tracing::info!(%entity_id, target, "set_temperature");
        sensor.thermostat().set_temperature(target);
        sensor.entity()
    }

    async fn teardown(&mut self) -> Result<(), ThermoHubError> {
        let detached = self.detach_all();
        tracing::info!(detached, "demo integration stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use thermohub_domain::device::Device;
    use thermohub_domain::entity::EntityState;
    use thermohub_domain::event::Event;

    use crate::sensor::ATTR_TARGET_TEMPERATURE;
    use thermohub_domain::entity::AttributeValue;

    #[derive(Clone, Default)]
    struct RecordingContext {
        entities: Arc<Mutex<Vec<Entity>>>,
    }

    impl IntegrationContext for RecordingContext {
        fn upsert_device(&self, device: Device) -> Result<Device, ThermoHubError> {
            Ok(device)
        }

        fn upsert_entity(&self, entity: Entity) -> Result<Entity, ThermoHubError> {
            self.entities.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        fn publish(&self, _event: Event) -> Result<(), ThermoHubError> {
            Ok(())
        }
    }

    fn kitchen_config() -> DemoConfig {
        DemoConfig {
            host: "Kitchen".into(),
            online_probability: 1.0,
            connection_latency_ms: 0,
            ..DemoConfig::default()
        }
    }

    async fn ready(config: DemoConfig) -> (DemoIntegration, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let mut integration = DemoIntegration::new(config, scheduler.clone());
        let discovered = {
            let probe = integration.setup();
            tokio::pin!(probe);
            // Zero latency: the probe's wake-up is due immediately.
            loop {
                tokio::select! {
                    biased;
                    result = &mut probe => break result.unwrap(),
                    () = tokio::task::yield_now() => { scheduler.advance(Duration::ZERO); }
                }
            }
        };
        assert_eq!(discovered.len(), 3);
        (integration, scheduler)
    }

    fn kitchen_1() -> EntityId {
        EntityId::new("kitchen_1_temperature")
    }

    #[tokio::test]
    async fn should_return_demo_thermostat_as_name() {
        let integration = DemoIntegration::new(
            DemoConfig::default(),
            Arc::new(ManualScheduler::new()),
        );
        assert_eq!(integration.name(), "demo_thermostat");
        assert!(integration.hub().is_none());
    }

    #[tokio::test]
    async fn should_discover_one_device_per_thermostat() {
        let (integration, _) = ready(kitchen_config()).await;
        let hub = integration.hub().unwrap();

        assert_eq!(hub.hub_id().as_str(), "kitchen");
        let ids: Vec<&str> = integration
            .sensors()
            .iter()
            .map(|s| s.unique_id().as_str())
            .collect();
        assert_eq!(
            ids,
            [
                "kitchen_1_temperature",
                "kitchen_2_temperature",
                "kitchen_3_temperature"
            ]
        );
        assert!(integration.owns_entity(&kitchen_1()));
        assert!(!integration.owns_entity(&EntityId::new("garage_1_temperature")));
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_for_connection_probe_during_setup() {
        let scheduler = Arc::new(TokioScheduler::current().unwrap());
        let mut integration = DemoIntegration::new(DemoConfig::default(), scheduler);
        let start = tokio::time::Instant::now();

        let discovered = integration.setup().await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(discovered.len(), 3);
        assert_eq!(discovered[0].device.identifier.namespace, "demo_thermostat");
        assert_eq!(discovered[0].entities[0].friendly_name, "Demo Thermostat 1 Temperature");
    }

    #[tokio::test]
    async fn should_reject_invalid_config_on_setup() {
        let mut integration = DemoIntegration::new(
            DemoConfig {
                thermostat_count: 0,
                ..DemoConfig::default()
            },
            Arc::new(ManualScheduler::new()),
        );

        let result = integration.setup().await;
        assert!(matches!(result, Err(ThermoHubError::Integration(_))));
        assert!(integration.hub().is_none());
    }

    #[tokio::test]
    async fn should_set_target_and_converge_through_service_call() {
        let (integration, scheduler) = ready(kitchen_config()).await;

        let entity = integration
            .handle_service_call(
                &kitchen_1(),
                "set_temperature",
                serde_json::json!({"temperature": 18}),
            )
            .await
            .unwrap();

        assert_eq!(entity.state, EntityState::Measurement(22));
        assert_eq!(
            entity.get_attribute(ATTR_TARGET_TEMPERATURE),
            Some(&AttributeValue::Int(18))
        );

        scheduler.advance(Duration::from_secs(5));
        let sensor = &integration.sensors()[0];
        assert_eq!(sensor.entity().unwrap().state, EntityState::Measurement(18));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_entity() {
        let (integration, _) = ready(kitchen_config()).await;

        let result = integration
            .handle_service_call(
                &EntityId::new("garage_1_temperature"),
                "set_temperature",
                serde_json::json!({"temperature": 18}),
            )
            .await;

        assert!(matches!(result, Err(ThermoHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_unknown_service() {
        let (integration, _) = ready(kitchen_config()).await;

        let result = integration
            .handle_service_call(&kitchen_1(), "turn_on", serde_json::json!({}))
            .await;

        assert!(matches!(
            result,
            Err(ThermoHubError::Validation(ValidationError::UnsupportedService(s))) if s == "turn_on"
        ));
    }

    #[tokio::test]
    async fn should_reject_missing_or_non_integer_temperature() {
        let (integration, _) = ready(kitchen_config()).await;

        for data in [
            serde_json::json!({}),
            serde_json::json!({"temperature": "warm"}),
            serde_json::json!({"temperature": 20.5}),
            serde_json::json!({"temperature": 10_000_000_000_i64}),
        ] {
            let result = integration
                .handle_service_call(&kitchen_1(), "set_temperature", data)
                .await;
            assert!(matches!(
                result,
                Err(ThermoHubError::Validation(ValidationError::InvalidField("temperature")))
            ));
        }
        assert_eq!(integration.sensors()[0].thermostat().target_temperature(), 22);
    }

    #[tokio::test]
    async fn should_push_updates_after_start_background_until_teardown() {
        let (mut integration, scheduler) = ready(kitchen_config()).await;
        let ctx = RecordingContext::default();
        integration.start_background(ctx.clone()).await.unwrap();

        integration
            .handle_service_call(
                &kitchen_1(),
                "set_temperature",
                serde_json::json!({"temperature": 18}),
            )
            .await
            .unwrap();
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(ctx.entities.lock().unwrap().len(), 2);

        integration.teardown().await.unwrap();
        integration
            .handle_service_call(
                &kitchen_1(),
                "set_temperature",
                serde_json::json!({"temperature": 25}),
            )
            .await
            .unwrap();
        scheduler.advance(Duration::from_secs(5));

        assert_eq!(ctx.entities.lock().unwrap().len(), 2);
        assert!(integration.sensors().iter().all(|s| !s.is_attached()));
    }
}
