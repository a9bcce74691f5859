//! Configuration for the demo thermostat integration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::DemoError;

/// `[hub]` section of the daemon configuration.
///
/// Every field has a default, so an empty table is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Host identifier; lower-cased to form the hub id.
    pub host: String,
    pub thermostat_count: usize,
    /// Probability that a single online check of a thermostat succeeds.
    pub online_probability: f64,
    pub min_convergence_delay_secs: u64,
    pub max_convergence_delay_secs: u64,
    /// Simulated latency of the hub connectivity probe.
    pub connection_latency_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let settings = SimulationSettings::default();
        Self {
            host: "Demo".to_string(),
            thermostat_count: settings.thermostat_count,
            online_probability: settings.online_probability,
            min_convergence_delay_secs: settings.min_convergence_delay.as_secs(),
            max_convergence_delay_secs: settings.max_convergence_delay.as_secs(),
            connection_latency_ms: 1000,
        }
    }
}

impl DemoConfig {
    /// Check the values a hub cannot be built from.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), DemoError> {
        if self.host.trim().is_empty() {
            return Err(DemoError::InvalidConfig("host must not be empty".into()));
        }
        if self.thermostat_count == 0 {
            return Err(DemoError::InvalidConfig(
                "thermostat_count must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.online_probability) {
            return Err(DemoError::InvalidConfig(format!(
                "online_probability must be within [0, 1], got {}",
                self.online_probability
            )));
        }
        if self.min_convergence_delay_secs > self.max_convergence_delay_secs {
            return Err(DemoError::InvalidConfig(format!(
                "min_convergence_delay_secs ({}) exceeds max_convergence_delay_secs ({})",
                self.min_convergence_delay_secs, self.max_convergence_delay_secs
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            thermostat_count: self.thermostat_count,
            online_probability: self.online_probability,
            min_convergence_delay: Duration::from_secs(self.min_convergence_delay_secs),
            max_convergence_delay: Duration::from_secs(self.max_convergence_delay_secs),
            connection_latency: Duration::from_millis(self.connection_latency_ms),
        }
    }
}

/// Runtime parameters of a simulated hub.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub thermostat_count: usize,
    pub online_probability: f64,
    /// Convergence delays are drawn in whole seconds from
    /// `min_convergence_delay..=max_convergence_delay`.
    pub min_convergence_delay: Duration,
    pub max_convergence_delay: Duration,
    pub connection_latency: Duration,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            thermostat_count: 3,
            online_probability: 0.9,
            min_convergence_delay: Duration::from_secs(1),
            max_convergence_delay: Duration::from_secs(5),
            connection_latency: Duration::from_secs(1),
        }
    }
}
