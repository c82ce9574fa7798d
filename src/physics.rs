use crate::transform::Transform;
use anyhow::bail;
use cgmath::{InnerSpace, Vector3};

const MAX_MOVE_STEPS: u32 = 1024;

/// Translates an entity, resolving whatever collision the world imposes.
pub trait Mover {
    fn move_by(&mut self, transform: &mut Transform, motion: Vector3<f32>);
}

/// Moves without any collision.
pub struct FreeMover;

impl Mover for FreeMover {
    fn move_by(&mut self, transform: &mut Transform, motion: Vector3<f32>) {
        transform.position += motion;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self {
            min: Vector3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Vector3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    fn overlaps_span(&self, bottom: f32, top: f32) -> bool {
        bottom < self.max.y && top > self.min.y
    }
}

/// Upright capsule sliding against static boxes on the horizontal plane.
///
/// The capsule is centred on the transform position. Motion is split into
/// steps no longer than half the radius so a single call cannot tunnel
/// through a box thinner than the capsule, up to `MAX_MOVE_STEPS` steps.
pub struct CollisionWorld {
    pub radius: f32,
    pub height: f32,
    obstacles: Vec<Aabb>,
}

impl CollisionWorld {
    pub fn new(radius: f32, height: f32) -> anyhow::Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            bail!("Capsule radius must be positive and finite, got {}", radius);
        }
        if !height.is_finite() || height < 0.0 {
            bail!("Capsule height must be non-negative and finite, got {}", height);
        }

        Ok(Self {
            radius,
            height,
            obstacles: Vec::new(),
        })
    }

    pub fn add_obstacle(&mut self, obstacle: Aabb) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    fn resolve(&self, mut position: Vector3<f32>) -> Vector3<f32> {
        let half_height = self.height*0.5;
        let radius = self.radius;

        for obstacle in &self.obstacles {
            if !obstacle.overlaps_span(position.y - half_height, position.y + half_height) {
                continue;
            }

            let closest_x = position.x.clamp(obstacle.min.x, obstacle.max.x);
            let closest_z = position.z.clamp(obstacle.min.z, obstacle.max.z);
            let dx = position.x - closest_x;
            let dz = position.z - closest_z;
            let distance_sq = dx*dx + dz*dz;

            if distance_sq >= radius*radius {
                continue;
            }

            if distance_sq > 1e-12 {
                let distance = distance_sq.sqrt();
                let push = (radius - distance)/distance;
                position.x += dx*push;
                position.z += dz*push;
            }
            else {
                // Centre is inside the footprint: leave through the nearest face.
                let faces = [
                    (position.x - obstacle.min.x, Vector3::new(obstacle.min.x - radius, position.y, position.z)),
                    (obstacle.max.x - position.x, Vector3::new(obstacle.max.x + radius, position.y, position.z)),
                    (position.z - obstacle.min.z, Vector3::new(position.x, position.y, obstacle.min.z - radius)),
                    (obstacle.max.z - position.z, Vector3::new(position.x, position.y, obstacle.max.z + radius)),
                ];

                if let Some((_, exit)) = faces.iter().min_by(|a, b| a.0.total_cmp(&b.0)) {
                    position = *exit;
                }
            }
        }

        position
    }
}

impl Mover for CollisionWorld {
    fn move_by(&mut self, transform: &mut Transform, motion: Vector3<f32>) {
        let length = motion.magnitude();
        if !length.is_finite() {
            log::warn!("Ignoring non-finite motion {:?}", motion);
            return;
        }
        if length <= 0.0 {
            return;
        }

        let steps = ((length/(self.radius*0.5)).ceil() as u32).clamp(1, MAX_MOVE_STEPS);
        let step = motion/(steps as f32);

        let mut position = transform.position;
        for _ in 0..steps {
            position = self.resolve(position + step);
        }

        log::trace!("moved {:?} -> {:?}", transform.position, position);
        transform.position = position;
    }
}
