//! Simulated thermostat hub.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thermohub_domain::id::{HubId, ThermostatId};

use crate::config::SimulationSettings;
use crate::scheduler::Scheduler;
use crate::thermostat::Thermostat;

pub const MANUFACTURER: &str = "Demonstration Corp";

/// A gateway owning a fixed, ordered set of thermostats.
///
/// Thermostats keep a weak back-reference to their hub, so a hub is always
/// handed out behind an [`Arc`].
pub struct Hub {
    id: HubId,
    name: String,
    online: AtomicBool,
    thermostats: Vec<Thermostat>,
    scheduler: Arc<dyn Scheduler>,
    connection_latency: Duration,
}

impl Hub {
    /// Build a hub named `host` with `settings.thermostat_count` thermostats.
    ///
    /// The hub id is `host` lower-cased; thermostat `n` (1-based) gets the
    /// id `{hub_id}_{n}` and the name `{host} Thermostat {n}`.
    #[must_use]
    pub fn new(host: &str, settings: &SimulationSettings, scheduler: Arc<dyn Scheduler>) -> Arc<Self> {
        let id = HubId::new(host.to_lowercase());
        let hub = Arc::new_cyclic(|this| {
            let thermostats = (1..=settings.thermostat_count)
                .map(|n| {
                    Thermostat::new(
                        ThermostatId::new(format!("{id}_{n}")),
                        format!("{host} Thermostat {n}"),
                        this.clone(),
                        settings,
                        Arc::clone(&scheduler),
                    )
                })
                .collect();
            Self {
                id,
                name: host.to_string(),
                online: AtomicBool::new(true),
                thermostats,
                scheduler,
                connection_latency: settings.connection_latency,
            }
        });
        tracing::info!(hub = %hub.id, thermostats = hub.thermostats.len(), "hub created");
        hub
    }

    #[must_use]
    pub fn hub_id(&self) -> &HubId {
        &self.id
    }

    /// The host identifier as given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn manufacturer(&self) -> &'static str {
        MANUFACTURER
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::AcqRel);
        if was != online {
            tracing::info!(hub = %self.id, online, "hub connectivity changed");
        }
    }

    #[must_use]
    pub fn thermostats(&self) -> &[Thermostat] {
        &self.thermostats
    }

    #[must_use]
    pub fn thermostat(&self, id: &ThermostatId) -> Option<&Thermostat> {
        self.thermostats.iter().find(|t| t.id() == id)
    }

    /// Probe the hub. Always answers after the configured latency.
    ///
    /// The probe result does not feed back into [`is_online`](Self::is_online).
    pub async fn test_connection(&self) -> bool {
        tracing::debug!(hub = %self.id, latency = ?self.connection_latency, "testing hub connection");
        self.scheduler.sleep(self.connection_latency).await;
        true
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("id", &self.id)
            .field("online", &self.is_online())
            .field("thermostats", &self.thermostats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{ManualScheduler, TokioScheduler};

    fn manual_hub(host: &str, count: usize) -> (Arc<Hub>, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let settings = SimulationSettings {
            thermostat_count: count,
            ..SimulationSettings::default()
        };
        (Hub::new(host, &settings, scheduler.clone()), scheduler)
    }

    #[test]
    fn should_lowercase_host_for_hub_id() {
        let (hub, _) = manual_hub("Kitchen", 3);

        assert_eq!(hub.hub_id().as_str(), "kitchen");
        assert_eq!(hub.name(), "Kitchen");
        assert_eq!(hub.manufacturer(), "Demonstration Corp");
        assert!(hub.is_online());
    }

    #[test]
    fn should_build_numbered_thermostats() {
        let (hub, _) = manual_hub("Kitchen", 3);

        let ids: Vec<&str> = hub.thermostats().iter().map(|t| t.id().as_str()).collect();
        let names: Vec<&str> = hub.thermostats().iter().map(Thermostat::name).collect();
        assert_eq!(ids, ["kitchen_1", "kitchen_2", "kitchen_3"]);
        assert_eq!(
            names,
            [
                "Kitchen Thermostat 1",
                "Kitchen Thermostat 2",
                "Kitchen Thermostat 3"
            ]
        );
    }

    #[test]
    fn should_wire_back_reference_to_owning_hub() {
        let (hub, _) = manual_hub("Kitchen", 2);

        for thermostat in hub.thermostats() {
            let owner = thermostat.hub().unwrap();
            assert!(Arc::ptr_eq(&owner, &hub));
        }
    }

    #[test]
    fn should_look_up_thermostat_by_id() {
        let (hub, _) = manual_hub("Kitchen", 3);

        let found = hub.thermostat(&ThermostatId::new("kitchen_2")).unwrap();
        assert_eq!(found.name(), "Kitchen Thermostat 2");
        assert!(hub.thermostat(&ThermostatId::new("kitchen_4")).is_none());
    }

    #[test]
    fn should_toggle_online_flag() {
        let (hub, _) = manual_hub("Kitchen", 1);

        hub.set_online(false);
        assert!(!hub.is_online());
        hub.set_online(true);
        assert!(hub.is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn should_answer_connection_probe_after_latency() {
        let scheduler = Arc::new(TokioScheduler::current().unwrap());
        let hub = Hub::new("Kitchen", &SimulationSettings::default(), scheduler);
        let start = tokio::time::Instant::now();

        assert!(hub.test_connection().await);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert!(hub.is_online());
    }

    #[tokio::test]
    async fn should_wait_for_manual_clock_before_answering_probe() {
        let (hub, scheduler) = manual_hub("Kitchen", 1);
        let probe = tokio::spawn({
            let hub = Arc::clone(&hub);
            async move { hub.test_connection().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.advance(Duration::from_millis(999));
        tokio::task::yield_now().await;
        assert!(!probe.is_finished());

        scheduler.advance(Duration::from_millis(1));
        assert!(probe.await.unwrap());
    }
}
