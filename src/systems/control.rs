use crate::actions::ActionQueue;
use crate::controller::AgentController;
use crate::ecs::EntityComponentSystem;
use crate::entity::EntityId;
use crate::input::{Input, Key};
use crate::physics::Mover;
use crate::system::System;
use crate::transform::Transform;
use std::collections::HashSet;

/// Drives every agent once per tick through the injected mover.
pub struct ControlSystem {
    mover: Box<dyn Mover>,
}

impl ControlSystem {
    pub fn new(mover: Box<dyn Mover>) -> Self {
        Self { mover }
    }
}

impl System for ControlSystem {
    fn run(&mut self, ecs: &mut EntityComponentSystem, entities: &HashSet<EntityId>, input: &Input, _delta_time: f32) -> anyhow::Result<()> {
        let mut transforms = ecs.get_component_set::<Transform>()?.borrow_mut();
        let controllers = ecs.get_component_set::<AgentController>()?.borrow();
        let mut queues = ecs.get_component_set::<ActionQueue>()?.borrow_mut();

        for entity in entities {
            match (transforms.get_mut(entity), controllers.get(entity)) {
                (Some(transform), Some(controller)) => {
                    // Codes are consumed every tick, even while manual or paralyzed.
                    let code = queues.get_mut(entity).and_then(|queue| queue.next_code()).unwrap_or_default();
                    controller.perform_action_code(&code, input, transform, self.mover.as_mut());
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn is_system_entity(&self, entity: &EntityId, ecs: &EntityComponentSystem) -> bool {
        ecs.has_component::<Transform>(entity) && ecs.has_component::<AgentController>(entity)
    }
}

/// Flips the controller flags on the tick their toggle key goes down.
pub struct ToggleSystem {}

impl System for ToggleSystem {
    fn run(&mut self, ecs: &mut EntityComponentSystem, entities: &HashSet<EntityId>, input: &Input, _delta_time: f32) -> anyhow::Result<()> {
        let toggle_manual = input.is_key_down(Key::ToggleManual);
        let toggle_pause = input.is_key_down(Key::TogglePause);
        if !toggle_manual && !toggle_pause {
            return Ok(());
        }

        let mut controllers = ecs.get_component_set::<AgentController>()?.borrow_mut();
        for entity in entities {
            if let Some(controller) = controllers.get_mut(entity) {
                if toggle_manual {
                    controller.manual_override = !controller.manual_override;
                    log::info!("Entity {} manual override: {}", entity.index, controller.manual_override);
                }
                if toggle_pause {
                    controller.paralyzed = !controller.paralyzed;
                    log::info!("Entity {} paralyzed: {}", entity.index, controller.paralyzed);
                }
            }
        }

        Ok(())
    }

    fn is_system_entity(&self, entity: &EntityId, ecs: &EntityComponentSystem) -> bool {
        ecs.has_component::<AgentController>(entity)
    }
}
