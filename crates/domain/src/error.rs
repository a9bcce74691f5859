//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ThermoHubError`] via `#[from]` at the port boundary.

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum ThermoHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("hub unreachable")]
    HubUnreachable(#[from] HubUnreachableError),

    /// An adapter-specific failure that has no domain counterpart.
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected while building or updating domain values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("device identifier must have a namespace and an id")]
    EmptyDeviceIdentifier,

    #[error("service {0:?} is not supported")]
    UnsupportedService(String),

    #[error("missing or invalid field {0:?}")]
    InvalidField(&'static str),
}

/// A lookup by id found nothing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of the missing thing (`"Entity"`, `"Device"`, …).
    pub entity: &'static str,
    pub id: String,
}

/// The connectivity probe of a hub failed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("hub {hub_id} did not answer the connectivity probe")]
pub struct HubUnreachableError {
    pub hub_id: String,
}
