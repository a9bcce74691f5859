//! Errors raised by the demo thermostat integration.

use thermohub_domain::error::{HubUnreachableError, NotFoundError, ThermoHubError};
use thermohub_domain::id::{EntityId, HubId};

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// The connectivity probe failed during setup.
    #[error("hub {hub_id} is unreachable")]
    HubUnreachable { hub_id: HubId },

    /// A command addressed an entity this integration does not own.
    #[error("unknown device: {0}")]
    UnknownDevice(EntityId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no tokio runtime available")]
    NoRuntime,

    #[error(transparent)]
    Domain(#[from] ThermoHubError),
}

impl DemoError {
    /// Map onto the host error taxonomy.
    #[must_use]
    pub fn into_domain(self) -> ThermoHubError {
        match self {
            Self::HubUnreachable { hub_id } => HubUnreachableError {
                hub_id: hub_id.to_string(),
            }
            .into(),
            Self::UnknownDevice(id) => NotFoundError {
                entity: "Thermostat",
                id: id.to_string(),
            }
            .into(),
            Self::Domain(err) => err,
            other @ (Self::InvalidConfig(_) | Self::NoRuntime) => {
                ThermoHubError::Integration(Box::new(other))
            }
        }
    }
}

impl From<DemoError> for ThermoHubError {
    fn from(err: DemoError) -> Self {
        err.into_domain()
    }
}
