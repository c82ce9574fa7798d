use crate::actions::ActionQueue;
use crate::controller::{AgentController, ControllerSettings};
use crate::ecs::EntityComponentSystem;
use crate::entity::EntityId;
use crate::physics::{Aabb, CollisionWorld};
use crate::preferences::Preferences;
use crate::transform::Transform;

use anyhow::{anyhow, Context};
use cgmath::{Deg, Vector3};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Flags an agent starts with.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ControllerFlags {
    pub manual_override: bool,
    pub paralyzed: bool,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Prefab {
    pub position: [f32; 3],
    /// Initial heading in degrees.
    pub yaw: f32,
    /// Present on controllable agents only.
    pub controller: Option<ControllerFlags>,
    /// Action codes replayed in a loop when nothing else is queued.
    pub actions: Vec<String>,
}

impl Prefab {
    pub fn instantiate(&self, ecs: &mut EntityComponentSystem, preferences: &Preferences) -> anyhow::Result<EntityId> {
        let transform = Transform::new(Vector3::from(self.position), Deg(self.yaw));

        let controller = match &self.controller {
            Some(flags) => {
                let mut controller = AgentController::from_preferences(preferences)?;
                controller.manual_override = flags.manual_override;
                controller.paralyzed = flags.paralyzed;
                Some(controller)
            }
            None => None,
        };

        let actions = controller.as_ref().map(|_| ActionQueue::looping(self.actions.clone()));

        ecs.create_entity(Some(transform), controller, actions)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ObstacleConfig {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub max_entities: usize,
    pub capsule_radius: f32,
    pub capsule_height: f32,
    pub obstacles: Vec<ObstacleConfig>,
    /// Prefab names spawned in order.
    pub spawn: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_entities: 64,
            capsule_radius: 0.5,
            capsule_height: 2.0,
            obstacles: Vec::new(),
            spawn: Vec::new(),
        }
    }
}

pub struct Resources {
    pub preferences: Preferences,
    pub scene: SceneConfig,
    pub prefabs: HashMap<String, Prefab>,
}

impl Resources {
    /// Loads `preferences.json`, `scene.json` and every `prefabs/*.json` under `root`.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let preferences = Preferences::load(&root.join("preferences.json"))?;

        let scene_path = root.join("scene.json");
        let contents = fs::read(&scene_path).with_context(|| format!("Failed to read scene {:?}", scene_path))?;
        let scene: SceneConfig = serde_json::from_slice(&contents).with_context(|| format!("Failed to parse scene {:?}", scene_path))?;

        let prefabs = Resources::load_all_prefabs(&root.join("prefabs"))?;
        log::info!("Loaded {} prefabs from {:?}", prefabs.len(), root);

        let resources = Self {
            preferences,
            scene,
            prefabs,
        };

        // Fail at load time rather than on the first spawn or move.
        ControllerSettings::from_preferences(&resources.preferences).with_context(|| format!("Invalid preferences in {:?}", root))?;
        resources.collision_world().with_context(|| format!("Invalid capsule in {:?}", scene_path))?;

        Ok(resources)
    }

    fn load_all_prefabs(prefab_dir: &Path) -> anyhow::Result<HashMap<String, Prefab>> {
        let paths = fs::read_dir(prefab_dir).with_context(|| format!("Failed to list prefabs in {:?}", prefab_dir))?;

        let mut prefabs = HashMap::new();

        for entry in paths {
            let path = entry?.path();
            if path.extension().map_or(true, |extension| extension != "json") {
                continue;
            }

            let contents = fs::read(&path).with_context(|| format!("Failed to read prefab {:?}", path))?;
            let prefab: Prefab = serde_json::from_slice(&contents).with_context(|| format!("Failed to parse prefab {:?}", path))?;
            let key = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| anyhow!("Prefab file name is not valid UTF-8: {:?}", path))?
                .to_owned();

            prefabs.insert(key, prefab);
        }

        Ok(prefabs)
    }

    pub fn collision_world(&self) -> anyhow::Result<CollisionWorld> {
        let mut world = CollisionWorld::new(self.scene.capsule_radius, self.scene.capsule_height)?;
        for obstacle in &self.scene.obstacles {
            world.add_obstacle(Aabb::new(Vector3::from(obstacle.min), Vector3::from(obstacle.max)));
        }
        Ok(world)
    }

    pub fn spawn_scene(&self, ecs: &mut EntityComponentSystem) -> anyhow::Result<Vec<EntityId>> {
        self.scene
            .spawn
            .iter()
            .map(|name| {
                let prefab = self.prefabs.get(name).ok_or_else(|| anyhow!("Scene spawns unknown prefab {:?}", name))?;
                prefab.instantiate(ecs, &self.preferences)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Prefab, Resources};
    use crate::controller::AgentController;
    use crate::ecs::EntityComponentSystem;
    use crate::transform::Transform;
    use approx::assert_abs_diff_eq;
    use std::fs;
    use tempfile::TempDir;

    fn asset_dir(scene: &str) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("prefabs")).unwrap();
        fs::write(root.path().join("scene.json"), scene).unwrap();
        root
    }

    #[test]
    fn loads_scene_and_spawns_agents_with_preferred_speeds() {
        let root = asset_dir(r#"{"capsule_radius": 0.25, "obstacles": [{"min": [0, 0, 0], "max": [1, 1, 1]}], "spawn": ["agent", "crate"]}"#);
        let prefabs = root.path().join("prefabs");
        fs::write(root.path().join("preferences.json"), r#"{"Rotation Speed": 20.0}"#).unwrap();
        fs::write(prefabs.join("agent.json"), r#"{"position": [1, 0, 2], "yaw": 90, "controller": {"paralyzed": true}, "actions": ["2"]}"#).unwrap();
        fs::write(prefabs.join("crate.json"), r#"{"position": [4, 0, 4]}"#).unwrap();
        fs::write(prefabs.join("notes.txt"), "ignored").unwrap();

        let resources = Resources::load(root.path()).unwrap();
        assert_eq!(resources.prefabs.len(), 2);
        let world = resources.collision_world().unwrap();
        assert_eq!(world.obstacles().len(), 1);
        assert_eq!(world.radius, 0.25);

        let mut ecs = EntityComponentSystem::new(resources.scene.max_entities);
        let spawned = resources.spawn_scene(&mut ecs).unwrap();
        assert_eq!(spawned.len(), 2);

        let controllers = ecs.get_component_set::<AgentController>().unwrap().borrow();
        let agent = controllers.get(&spawned[0]).unwrap();
        assert!(agent.paralyzed);
        assert!(!agent.manual_override);
        assert_eq!(agent.rotation_speed(), 20.0);
        assert_eq!(agent.movement_speed(), 1.0);
        assert!(controllers.get(&spawned[1]).is_none());

        let transforms = ecs.get_component_set::<Transform>().unwrap().borrow();
        assert_abs_diff_eq!(transforms.get(&spawned[0]).unwrap().yaw().0, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn unknown_prefab_in_scene_is_an_error() {
        let root = asset_dir(r#"{"spawn": ["ghost"]}"#);
        let resources = Resources::load(root.path()).unwrap();
        let mut ecs = EntityComponentSystem::new(4);
        assert!(resources.spawn_scene(&mut ecs).is_err());
    }

    #[test]
    fn missing_scene_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("prefabs")).unwrap();
        assert!(Resources::load(root.path()).is_err());
    }

    #[test]
    fn zero_capsule_radius_is_rejected_at_load() {
        let root = asset_dir(r#"{"capsule_radius": 0.0}"#);
        assert!(Resources::load(root.path()).is_err());
    }

    #[test]
    fn overflowing_movement_speed_is_rejected_at_load() {
        let root = asset_dir("{}");
        fs::write(root.path().join("preferences.json"), r#"{"Movement Speed": 1e39}"#).unwrap();
        assert!(Resources::load(root.path()).is_err());
    }

    #[test]
    fn prefab_fields_default_when_omitted() {
        let prefab: Prefab = serde_json::from_str("{}").unwrap();
        assert_eq!(prefab, Prefab::default());
    }
}
