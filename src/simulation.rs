use crate::actions::ActionQueue;
use crate::controller::AgentController;
use crate::ecs::EntityComponentSystem;
use crate::entity::EntityId;
use crate::input::Input;
use crate::physics::Mover;
use crate::resources::Resources;
use crate::system::SystemManager;
use crate::control::{ControlSystem, ToggleSystem};
use crate::transform::Transform;

/// Pose of one agent after a tick, as reported to the external controller.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct Pose {
    pub tick: u64,
    pub entity: usize,
    pub position: [f32; 3],
    pub yaw: f32,
    pub manual_override: bool,
    pub paralyzed: bool,
}

pub struct Simulation {
    ecs: EntityComponentSystem,
    systems: SystemManager,
    tick: u64,
}

impl Simulation {
    pub fn new(ecs: EntityComponentSystem, mover: Box<dyn Mover>) -> Self {
        Self {
            ecs,
            systems: SystemManager::new(vec![
                Box::new(ToggleSystem {}),
                Box::new(ControlSystem::new(mover)),
            ]),
            tick: 0,
        }
    }

    pub fn from_resources(resources: &Resources) -> anyhow::Result<Self> {
        let mut ecs = EntityComponentSystem::new(resources.scene.max_entities);
        let spawned = resources.spawn_scene(&mut ecs)?;
        let world = resources.collision_world()?;
        log::info!("Spawned {} entities among {} obstacles", spawned.len(), world.obstacles().len());

        Ok(Self::new(ecs, Box::new(world)))
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Agents sorted by slot so reports keep a stable order.
    pub fn agents(&self) -> Vec<EntityId> {
        let mut agents: Vec<EntityId> = self
            .ecs
            .active_entities()
            .iter()
            .filter(|entity| self.ecs.has_component::<AgentController>(entity))
            .copied()
            .collect();
        agents.sort_by_key(|entity| entity.index);
        agents
    }

    /// Queues `code` on every agent for the next tick.
    pub fn queue_code(&mut self, code: &str) -> anyhow::Result<()> {
        let mut queues = self.ecs.get_component_set::<ActionQueue>()?.borrow_mut();
        for agent in self.agents() {
            if let Some(queue) = queues.get_mut(&agent) {
                queue.push(code);
            }
        }
        Ok(())
    }

    /// Flips manual override on every agent.
    pub fn toggle_manual(&mut self) -> anyhow::Result<()> {
        self.update_controllers(|controller| controller.manual_override = !controller.manual_override)
    }

    /// Flips paralysis on every agent.
    pub fn toggle_paralyzed(&mut self) -> anyhow::Result<()> {
        self.update_controllers(|controller| controller.paralyzed = !controller.paralyzed)
    }

    fn update_controllers<F: FnMut(&mut AgentController)>(&mut self, mut update: F) -> anyhow::Result<()> {
        let mut controllers = self.ecs.get_component_set::<AgentController>()?.borrow_mut();
        for agent in self.ecs.active_entities() {
            if let Some(controller) = controllers.get_mut(agent) {
                update(controller);
            }
        }
        Ok(())
    }

    pub fn step(&mut self, input: &Input, delta_time: f32) -> anyhow::Result<()> {
        self.systems.run(&mut self.ecs, input, delta_time)?;
        self.tick += 1;
        Ok(())
    }

    pub fn poses(&self) -> anyhow::Result<Vec<Pose>> {
        let transforms = self.ecs.get_component_set::<Transform>()?.borrow();
        let controllers = self.ecs.get_component_set::<AgentController>()?.borrow();

        Ok(self
            .agents()
            .into_iter()
            .filter_map(|agent| {
                let transform = transforms.get(&agent)?;
                let controller = controllers.get(&agent)?;
                Some(Pose {
                    tick: self.tick,
                    entity: agent.index,
                    position: transform.position.into(),
                    yaw: transform.yaw().0,
                    manual_override: controller.manual_override,
                    paralyzed: controller.paralyzed,
                })
            })
            .collect())
    }
}
