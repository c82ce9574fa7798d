use crate::ecs::EntityComponentSystem;
use crate::entity::EntityId;
use crate::input::Input;
use std::collections::HashSet;

pub trait System {
    fn run(&mut self, ecs: &mut EntityComponentSystem, entities: &HashSet<EntityId>, input: &Input, delta_time: f32) -> anyhow::Result<()>;
    fn is_system_entity(&self, entity: &EntityId, ecs: &EntityComponentSystem) -> bool;
}

pub struct SystemManager {
    systems: Vec<(Box<dyn System>, HashSet<EntityId>)>,
}

impl SystemManager {
    // Systems are executed in the order given.
    pub fn new(systems: Vec<Box<dyn System>>) -> Self {
        Self {
            systems: systems.into_iter().map(|system| (system, HashSet::new())).collect()
        }
    }

    pub fn run(&mut self, ecs: &mut EntityComponentSystem, input: &Input, delta_time: f32) -> anyhow::Result<()> {
        for entity in ecs.destroy_entities()? {
            for (_, entities) in &mut self.systems {
                entities.remove(&entity);
            }
        }

        for entity in ecs.create_entities() {
            for (system, entities) in &mut self.systems {
                if system.is_system_entity(&entity, ecs) {
                    entities.insert(entity);
                }
            }
        }

        for (system, entities) in &mut self.systems {
            system.run(ecs, entities, input, delta_time)?;
        }

        Ok(())
    }

    #[allow(dead_code)]
    pub fn system_entities(&self, index: usize) -> Option<&HashSet<EntityId>> {
        self.systems.get(index).map(|(_, entities)| entities)
    }
}
