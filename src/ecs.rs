use crate::actions::ActionQueue;
use crate::component::ComponentSet;
use crate::controller::AgentController;
use crate::entity::*;
use crate::transform::Transform;

use anyhow::anyhow;
use anymap::AnyMap;
use std::cell::RefCell;
use std::collections::HashSet;

pub struct EntityComponentSystem {
    entity_allocator: EntityAllocator,

    components: AnyMap,
    created: Vec<EntityId>,
    destroyed: Vec<EntityId>,
}

impl EntityComponentSystem {
    pub fn new(max_entities: usize) -> Self {
        let entity_allocator = EntityAllocator::new(max_entities);

        let mut components = AnyMap::new();
        components.insert(RefCell::new(ComponentSet::<Transform>::new(entity_allocator.max_size)));
        components.insert(RefCell::new(ComponentSet::<AgentController>::new(entity_allocator.max_size)));
        components.insert(RefCell::new(ComponentSet::<ActionQueue>::new(entity_allocator.max_size)));

        Self {
            entity_allocator,
            components,
            created: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    pub fn get_component_set<T: 'static>(&self) -> anyhow::Result<&RefCell<ComponentSet<T>>> {
        self.components
            .get::<RefCell<ComponentSet<T>>>()
            .ok_or_else(|| anyhow!("No component set registered for {}", std::any::type_name::<T>()))
    }

    pub fn create_entity(&mut self, transform: Option<Transform>, controller: Option<AgentController>, actions: Option<ActionQueue>) -> anyhow::Result<EntityId> {
        let entity = self.entity_allocator.allocate()?;

        self.add_component(&entity, transform)?;
        self.add_component(&entity, controller)?;
        self.add_component(&entity, actions)?;

        self.created.push(entity);
        Ok(entity)
    }

    /// Queues `entity` for removal at the start of the next tick.
    pub fn destroy_entity(&mut self, entity: &EntityId) -> anyhow::Result<()> {
        if !self.entity_allocator.is_alive(entity) {
            return Err(anyhow!("Cannot destroy inactive entity {:?}", entity));
        }

        if !self.destroyed.contains(entity) {
            self.destroyed.push(*entity);
        }
        Ok(())
    }

    /// Drains entities created since the last call.
    pub fn create_entities(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.created)
    }

    /// Frees queued entities along with their components and returns them.
    pub fn destroy_entities(&mut self) -> anyhow::Result<Vec<EntityId>> {
        let destroyed = std::mem::take(&mut self.destroyed);

        for entity in &destroyed {
            self.get_component_set::<Transform>()?.borrow_mut().remove(entity);
            self.get_component_set::<AgentController>()?.borrow_mut().remove(entity);
            self.get_component_set::<ActionQueue>()?.borrow_mut().remove(entity);
            self.entity_allocator.deallocate(entity)?;
        }

        self.created.retain(|entity| !destroyed.contains(entity));
        Ok(destroyed)
    }

    pub fn has_component<T: 'static>(&self, entity: &EntityId) -> bool {
        match self.get_component_set::<T>() {
            Ok(set) => set.borrow().contains(entity),
            Err(_) => false,
        }
    }

    pub fn active_entities(&self) -> &HashSet<EntityId> {
        &self.entity_allocator.active_entities
    }

    fn add_component<T: 'static>(&self, entity: &EntityId, component: Option<T>) -> anyhow::Result<()> {
        if let Some(value) = component {
            self.get_component_set::<T>()?.borrow_mut().set(entity, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::EntityComponentSystem;
    use crate::actions::ActionQueue;
    use crate::controller::AgentController;
    use crate::transform::Transform;

    #[test]
    fn created_entities_are_reported_once() {
        let mut ecs = EntityComponentSystem::new(4);
        let entity = ecs.create_entity(Some(Transform::default()), Some(AgentController::default()), None).unwrap();
        assert_eq!(ecs.create_entities(), vec![entity]);
        assert!(ecs.create_entities().is_empty());
        assert!(ecs.has_component::<Transform>(&entity));
        assert!(ecs.has_component::<AgentController>(&entity));
        assert!(!ecs.has_component::<ActionQueue>(&entity));
    }

    #[test]
    fn destroyed_entity_loses_its_components() {
        let mut ecs = EntityComponentSystem::new(4);
        let entity = ecs.create_entity(Some(Transform::default()), None, Some(ActionQueue::new())).unwrap();
        ecs.destroy_entity(&entity).unwrap();
        assert_eq!(ecs.destroy_entities().unwrap(), vec![entity]);
        assert!(!ecs.has_component::<Transform>(&entity));
        assert!(!ecs.active_entities().contains(&entity));
        assert!(ecs.create_entities().is_empty());
        assert!(ecs.destroy_entity(&entity).is_err());
    }

    #[test]
    fn unregistered_component_type_is_an_error() {
        let ecs = EntityComponentSystem::new(1);
        assert!(ecs.get_component_set::<String>().is_err());
    }
}
