//! Application services: use-case implementations.
//!
//! Services keep the host's current view of devices and entities in memory.
//! Nothing here is persisted; a restart rediscovers everything from the
//! integrations.

pub mod device_service;
pub mod entity_service;
pub mod integration_context;
