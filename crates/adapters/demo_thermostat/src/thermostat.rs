//! Simulated thermostat.
//!
//! A thermostat has a target and a current temperature. Setting the target
//! notifies observers at once; the current temperature catches up after a
//! random delay, at which point observers are notified again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use thermohub_domain::id::ThermostatId;

use crate::config::SimulationSettings;
use crate::hub::Hub;
use crate::observer::{Observer, ObserverRegistry};
use crate::scheduler::Scheduler;

pub const MODEL: &str = "Test Thermostat";

/// Temperature both readings start at, in °C.
pub const DEFAULT_TEMPERATURE: i32 = 22;

/// Target and current temperature, read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperatures {
    pub target: i32,
    pub current: i32,
}

/// Handle to a thermostat owned by a [`Hub`].
///
/// Cloning is cheap; all clones refer to the same device.
#[derive(Clone)]
pub struct Thermostat {
    inner: Arc<Inner>,
}

struct Inner {
    id: ThermostatId,
    name: String,
    firmware_version: String,
    hub: Weak<Hub>,
    online_probability: f64,
    min_delay_secs: u64,
    max_delay_secs: u64,
    scheduler: Arc<dyn Scheduler>,
    shared: Arc<Shared>,
}

/// State touched by convergence tasks.
struct Shared {
    temperatures: Mutex<Temperatures>,
    observers: ObserverRegistry,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Temperatures> {
        self.temperatures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn converge(&self, id: &ThermostatId) {
        let current = {
            let mut temps = self.lock();
            temps.current = temps.target;
            temps.current
        };
        tracing::debug!(thermostat = %id, current, "current temperature converged");
        self.observers.notify_all();
    }
}

impl Thermostat {
    pub(crate) fn new(
        id: ThermostatId,
        name: String,
        hub: Weak<Hub>,
        settings: &SimulationSettings,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let firmware_version = format!("1.0.{}", rand::rng().random_range(1..=9));
        Self {
            inner: Arc::new(Inner {
                id,
                name,
                firmware_version,
                hub,
                online_probability: settings.online_probability,
                min_delay_secs: settings.min_convergence_delay.as_secs(),
                max_delay_secs: settings.max_convergence_delay.as_secs(),
                scheduler,
                shared: Arc::new(Shared {
                    temperatures: Mutex::new(Temperatures {
                        target: DEFAULT_TEMPERATURE,
                        current: DEFAULT_TEMPERATURE,
                    }),
                    observers: ObserverRegistry::default(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ThermostatId {
        &self.inner.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn model(&self) -> &'static str {
        MODEL
    }

    #[must_use]
    pub fn firmware_version(&self) -> &str {
        &self.inner.firmware_version
    }

    #[must_use]
    pub fn temperatures(&self) -> Temperatures {
        *self.inner.shared.lock()
    }

    #[must_use]
    pub fn target_temperature(&self) -> i32 {
        self.temperatures().target
    }

    #[must_use]
    pub fn current_temperature(&self) -> i32 {
        self.temperatures().current
    }

    /// The owning hub, or `None` once it has been dropped.
    #[must_use]
    pub fn hub(&self) -> Option<Arc<Hub>> {
        self.inner.hub.upgrade()
    }

    /// Sample connectivity. Every call is an independent draw.
    #[must_use]
    pub fn is_online(&self) -> bool {
        rand::rng().random::<f64>() < self.inner.online_probability
    }

    /// Online and attached to a hub that is online.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_online() && self.hub().is_some_and(|hub| hub.is_online())
    }

    /// Set a new target temperature.
    ///
    /// Observers are notified before this returns. The current temperature
    /// follows after a random delay; earlier pending convergences are not
    /// cancelled, and whichever fires first applies the target in effect at
    /// that moment.
    pub fn set_temperature(&self, target: i32) {
        self.inner.shared.lock().target = target;
        tracing::debug!(thermostat = %self.inner.id, target, "target temperature set");
        self.inner.shared.observers.notify_all();

        let delay = self.convergence_delay();
        let shared = Arc::clone(&self.inner.shared);
        let id = self.inner.id.clone();
        self.inner
            .scheduler
            .schedule(delay, Box::new(move || shared.converge(&id)));
    }

    /// Returns `false` if the observer was already registered.
    pub fn register_observer(&self, observer: Observer) -> bool {
        self.inner.shared.observers.register(observer)
    }

    /// Returns `false` if the observer was not registered.
    pub fn remove_observer(&self, observer: &Observer) -> bool {
        self.inner.shared.observers.remove(observer)
    }

    /// Invoke every registered observer once.
    pub fn notify_observers(&self) {
        self.inner.shared.observers.notify_all();
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.shared.observers.len()
    }

    fn convergence_delay(&self) -> Duration {
        let (min, max) = (self.inner.min_delay_secs, self.inner.max_delay_secs);
        if max <= min {
            return Duration::from_secs(min);
        }
        Duration::from_secs(rand::rng().random_range(min..=max))
    }
}

impl std::fmt::Debug for Thermostat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thermostat")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("temperatures", &self.temperatures())
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}
