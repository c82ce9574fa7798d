use crate::input::{Key, KeyState};
use crate::physics::Mover;
use crate::preferences::Preferences;
use crate::transform::Transform;
use anyhow::bail;
use cgmath::{Deg, Vector3};

pub const ROTATION_SPEED_KEY: &str = "Rotation Speed";
pub const MOVEMENT_SPEED_KEY: &str = "Movement Speed";

/// Speeds read once when a controller is created.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    /// Degrees per rotate call.
    pub rotation_speed: f32,
    /// Distance per forward move.
    pub movement_speed: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 10.0,
            movement_speed: 1.0,
        }
    }
}

impl ControllerSettings {
    /// Unset speeds take the defaults. Non-finite speeds are rejected.
    pub fn from_preferences(preferences: &Preferences) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let settings = Self {
            rotation_speed: preferences.get_float_or(ROTATION_SPEED_KEY, defaults.rotation_speed),
            movement_speed: preferences.get_float_or(MOVEMENT_SPEED_KEY, defaults.movement_speed),
        };

        if !settings.rotation_speed.is_finite() {
            bail!("{:?} must be finite, got {}", ROTATION_SPEED_KEY, settings.rotation_speed);
        }
        if !settings.movement_speed.is_finite() {
            bail!("{:?} must be finite, got {}", MOVEMENT_SPEED_KEY, settings.movement_speed);
        }

        Ok(settings)
    }
}

/// Discrete action decoded from an external action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RotateRight,
    RotateLeft,
    MoveForward,
    NoOp,
}

impl Action {
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Action::RotateRight,
            "1" => Action::RotateLeft,
            "2" => Action::MoveForward,
            _ => {
                log::debug!("Ignoring unrecognized action code {:?}", code);
                Action::NoOp
            }
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct AgentController {
    rotation_speed: f32,
    movement_speed: f32,
    pub manual_override: bool,
    pub paralyzed: bool,
}

impl Default for AgentController {
    fn default() -> Self {
        Self::new(&ControllerSettings::default())
    }
}

impl AgentController {
    pub fn new(settings: &ControllerSettings) -> Self {
        Self {
            rotation_speed: settings.rotation_speed,
            movement_speed: settings.movement_speed,
            manual_override: false,
            paralyzed: false,
        }
    }

    pub fn from_preferences(preferences: &Preferences) -> anyhow::Result<Self> {
        let mut controller = Self::default();
        controller.initialize(preferences)?;
        Ok(controller)
    }

    /// Re-reads both speeds from the preference store. Keeps the old speeds on error.
    pub fn initialize(&mut self, preferences: &Preferences) -> anyhow::Result<()> {
        let settings = ControllerSettings::from_preferences(preferences)?;
        self.rotation_speed = settings.rotation_speed;
        self.movement_speed = settings.movement_speed;
        Ok(())
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn perform_action_code<K: KeyState + ?Sized, M: Mover + ?Sized>(&self, code: &str, keys: &K, transform: &mut Transform, mover: &mut M) {
        self.perform_action(Action::from_code(code), keys, transform, mover);
    }

    /// Applies one tick of motion. Live keys replace `action` while manual override is on.
    pub fn perform_action<K: KeyState + ?Sized, M: Mover + ?Sized>(&self, action: Action, keys: &K, transform: &mut Transform, mover: &mut M) {
        if self.paralyzed {
            return;
        }

        if self.manual_override {
            if keys.is_key_held(Key::Right) {
                self.rotate(transform, Vector3::unit_y());
            }

            if keys.is_key_held(Key::Left) {
                self.rotate(transform, -Vector3::unit_y());
            }

            if keys.is_key_held(Key::Up) {
                self.move_forward(transform, mover);
            }

            return;
        }

        match action {
            Action::RotateRight => self.rotate(transform, Vector3::unit_y()),
            // Turns about the downward axis rather than negating the angle.
            Action::RotateLeft => self.rotate(transform, -Vector3::unit_y()),
            Action::MoveForward => self.move_forward(transform, mover),
            Action::NoOp => {}
        }
    }

    fn rotate(&self, transform: &mut Transform, axis: Vector3<f32>) {
        transform.rotate(axis, Deg(self.rotation_speed));
    }

    fn move_forward<M: Mover + ?Sized>(&self, transform: &mut Transform, mover: &mut M) {
        let direction = transform.transform_direction(Vector3::unit_z()*self.movement_speed);
        mover.move_by(transform, direction);
    }
}
