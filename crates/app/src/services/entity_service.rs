//! Entity service: the host's view of the current state of every entity.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thermohub_domain::entity::Entity;
use thermohub_domain::error::{NotFoundError, ThermoHubError};
use thermohub_domain::event::{Event, EventType};
use thermohub_domain::id::EntityId;
use thermohub_domain::time::now;

use crate::ports::EventPublisher;

/// Application service holding entity snapshots and announcing changes.
pub struct EntityService<EP> {
    entities: Mutex<HashMap<EntityId, Entity>>,
    publisher: EP,
}

impl<EP: EventPublisher> EntityService<EP> {
    /// Create a new service publishing through `publisher`.
    pub fn new(publisher: EP) -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
            publisher,
        }
    }

    /// Register a new entity or apply a fresh snapshot to an existing one.
    ///
    /// The first write publishes [`EventType::EntityRegistered`]; later
    /// writes publish [`EventType::StateChanged`] only when the state
    /// actually differs. Events are published while the registry lock is
    /// held, so subscribers see changes in the order they were applied.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::Validation`] if invariants fail, or a
    /// publisher error.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.id))]
    pub fn upsert_entity(&self, entity: Entity) -> Result<Entity, ThermoHubError> {
        entity.validate()?;
        let ts = now();
        let mut entities = self.lock();

        if let Some(existing) = entities.get_mut(&entity.id) {
            let from = existing.state;
            existing.device = entity.device;
            existing.friendly_name = entity.friendly_name;
            existing.attributes = entity.attributes;
            existing.update_state(entity.state, ts);

            let stored = existing.clone();
            if from != stored.state {
                tracing::debug!(%from, to = %stored.state, "entity state changed");
                self.publisher.publish(Event::new(
                    EventType::StateChanged,
                    Some(stored.id.clone()),
                    serde_json::json!({ "from": from, "to": stored.state }),
                ))?;
            }
            return Ok(stored);
        }

        let mut stored = entity;
        stored.last_changed = ts;
        stored.last_updated = ts;
        entities.insert(stored.id.clone(), stored.clone());
        tracing::debug!(state = %stored.state, "entity registered");
        self.publisher.publish(Event::new(
            EventType::EntityRegistered,
            Some(stored.id.clone()),
            serde_json::json!({
                "friendly_name": stored.friendly_name,
                "state": stored.state,
            }),
        ))?;
        Ok(stored)
    }

    /// Look up an entity by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::NotFound`] when no entity with `id` exists.
    pub fn get_entity(&self, id: &EntityId) -> Result<Entity, ThermoHubError> {
        self.lock().get(id).cloned().ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all entities, ordered by id.
    #[must_use]
    pub fn list_entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.lock().values().cloned().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities
    }

    /// Remove an entity and announce it.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoHubError::NotFound`] if the entity does not exist, or
    /// a publisher error.
    #[tracing::instrument(skip(self))]
    pub fn remove_entity(&self, id: &EntityId) -> Result<Entity, ThermoHubError> {
        let mut entities = self.lock();
        let removed = entities.remove(id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: id.to_string(),
        })?;
        self.publisher.publish(Event::new(
            EventType::EntityRemoved,
            Some(removed.id.clone()),
            serde_json::json!({}),
        ))?;
        Ok(removed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EntityId, Entity>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermohub_domain::entity::EntityState;
    use thermohub_domain::error::ValidationError;

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingPublisher {
        fn types(&self) -> Vec<EventType> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.event_type)
                .collect()
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, event: Event) -> Result<(), ThermoHubError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn make_service() -> EntityService<RecordingPublisher> {
        EntityService::new(RecordingPublisher::default())
    }

    fn reading(value: i64) -> Entity {
        Entity::builder()
            .id(EntityId::new("kitchen_1_temperature"))
            .friendly_name("Kitchen Thermostat 1 Temperature")
            .state(EntityState::Measurement(value))
            .build()
            .unwrap()
    }

    #[test]
    fn should_register_entity_and_publish_once() {
        let svc = make_service();
        svc.upsert_entity(reading(22)).unwrap();

        let fetched = svc
            .get_entity(&EntityId::new("kitchen_1_temperature"))
            .unwrap();
        assert_eq!(fetched.state, EntityState::Measurement(22));
        assert_eq!(svc.publisher.types(), [EventType::EntityRegistered]);
    }

    #[test]
    fn should_publish_state_changed_only_when_state_differs() {
        let svc = make_service();
        svc.upsert_entity(reading(22)).unwrap();
        svc.upsert_entity(reading(22)).unwrap();
        svc.upsert_entity(reading(18)).unwrap();

        assert_eq!(
            svc.publisher.types(),
            [EventType::EntityRegistered, EventType::StateChanged]
        );
        let events = svc.publisher.events.lock().unwrap();
        assert_eq!(events[1].data["to"]["value"], 18);
    }

    #[test]
    fn should_keep_last_changed_when_state_is_unchanged() {
        let svc = make_service();
        let first = svc.upsert_entity(reading(22)).unwrap();
        let second = svc.upsert_entity(reading(22)).unwrap();

        assert_eq!(second.last_changed, first.last_changed);
        assert!(second.last_updated >= first.last_updated);
    }

    #[test]
    fn should_reject_entity_with_empty_friendly_name() {
        let svc = make_service();
        let mut entity = reading(22);
        entity.friendly_name = String::new();

        let result = svc.upsert_entity(entity);
        assert!(matches!(
            result,
            Err(ThermoHubError::Validation(ValidationError::EmptyName))
        ));
        assert!(svc.publisher.types().is_empty());
    }

    #[test]
    fn should_return_not_found_when_entity_missing() {
        let svc = make_service();
        let result = svc.get_entity(&EntityId::new("nope"));
        assert!(matches!(result, Err(ThermoHubError::NotFound(_))));
    }

    #[test]
    fn should_list_entities_ordered_by_id() {
        let svc = make_service();
        let mut second = reading(20);
        second.id = EntityId::new("kitchen_2_temperature");
        svc.upsert_entity(second).unwrap();
        svc.upsert_entity(reading(22)).unwrap();

        let ids: Vec<String> = svc
            .list_entities()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, ["kitchen_1_temperature", "kitchen_2_temperature"]);
    }

    #[test]
    fn should_remove_entity_and_publish() {
        let svc = make_service();
        svc.upsert_entity(reading(22)).unwrap();

        svc.remove_entity(&EntityId::new("kitchen_1_temperature"))
            .unwrap();

        assert!(svc.list_entities().is_empty());
        assert_eq!(
            svc.publisher.types(),
            [EventType::EntityRegistered, EventType::EntityRemoved]
        );
    }

    #[test]
    fn should_return_not_found_when_removing_missing_entity() {
        let svc = make_service();
        let result = svc.remove_entity(&EntityId::new("nope"));
        assert!(matches!(result, Err(ThermoHubError::NotFound(_))));
    }
}
