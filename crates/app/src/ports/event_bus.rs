//! Event bus port: publish/subscribe for domain events.

use thermohub_domain::error::ThermoHubError;
use thermohub_domain::event::Event;

/// Publishes domain events to interested subscribers.
///
/// Publishing is synchronous: it is called from device observer callbacks,
/// which are plain closures and may run outside any async context.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    ///
    /// # Errors
    ///
    /// Implementations may fail when the underlying transport is gone.
    fn publish(&self, event: Event) -> Result<(), ThermoHubError>;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> Result<(), ThermoHubError> {
        (**self).publish(event)
    }
}
