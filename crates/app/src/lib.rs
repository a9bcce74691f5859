//! # thermohub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **integration port** that device adapters implement:
//!   - `Integration`: discover, start background updates, handle service calls, tear down
//!   - `IntegrationContext`: how an integration hands devices and entity snapshots to the host
//! - Define the `EventPublisher` port
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//! - Provide the host-side registries (`DeviceService`, `EntityService`) holding current state
//!
//! ## Dependency rule
//! Depends on `thermohub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
