//! # thermohub-domain
//!
//! Pure domain model for the thermohub thermostat simulation.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (descriptors linking entities to a physical or simulated unit)
//! - Define **Entities** (state holders with identity, e.g. a temperature reading)
//! - Define **Events** (registration and state-change records)
//! - Contain all invariant enforcement for these value types
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod entity;
pub mod event;
