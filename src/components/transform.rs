use cgmath::{Deg, InnerSpace, One, Quaternion, Rad, Rotation3, Vector3, Zero};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
        }
    }
}

impl Transform {
    /// Places the entity at `position`, turned `yaw` about the vertical axis.
    pub fn new(position: Vector3<f32>, yaw: Deg<f32>) -> Self {
        Self {
            position,
            rotation: Quaternion::from_axis_angle(Vector3::unit_y(), yaw),
        }
    }

    // Rotation is applied in local space, after the current orientation.
    pub fn rotate(&mut self, axis: Vector3<f32>, angle: Deg<f32>) {
        self.rotation = (self.rotation*Quaternion::from_axis_angle(axis.normalize(), angle)).normalize();
    }

    pub fn transform_direction(&self, direction: Vector3<f32>) -> Vector3<f32> {
        self.rotation*direction
    }

    /// Local +Z expressed in world space.
    pub fn forward(&self) -> Vector3<f32> {
        self.transform_direction(Vector3::unit_z())
    }

    /// Heading on the horizontal plane, measured from +Z towards +X.
    pub fn yaw(&self) -> Deg<f32> {
        let forward = self.forward();
        Deg::from(Rad(forward.x.atan2(forward.z)))
    }
}
