use crate::config::PhysicsConfig;
use macroquad::prelude::*;

/// Hull outline in body space. Origin is the centre of mass, -Y is the nose.
pub const HULL: [Vec2; 5] = [
    Vec2::new(0.0, -28.0),
    Vec2::new(-13.0, -6.0),
    Vec2::new(13.0, -6.0),
    Vec2::new(-16.0, 28.0),
    Vec2::new(16.0, 28.0),
];

/// Offset of the engine nozzle in body space.
pub const NOZZLE: Vec2 = Vec2::new(0.0, 30.0);

/// Resistance to spin from off-centre contact impulses.
const MOMENT_OF_INERTIA: f32 = 420.0;

// Rocket rigid body
#[derive(Debug, Clone)]
pub struct Rocket {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians, 0 = nose up, positive turns clockwise on screen.
    pub rotation: f32,
    /// Radians per second.
    pub angular_velocity: f32,
}

impl Rocket {
    pub fn new(start_pos: Vec2) -> Self {
        Self {
            position: start_pos,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
        }
    }

    /// Unit vector the nose points along.
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.rotation.sin(), -self.rotation.cos())
    }

    /// Accelerates along the rocket's own up axis.
    pub fn apply_relative_thrust(&mut self, acceleration: f32, dt: f32) {
        self.velocity += self.forward() * acceleration * dt;
    }

    pub fn rotate(&mut self, radians: f32) {
        self.rotation = wrap_angle(self.rotation + radians);
    }

    pub fn stop_spin(&mut self) {
        self.angular_velocity = 0.0;
    }

    /// Velocity change at a world-space offset from the centre of mass.
    pub fn apply_impulse_at(&mut self, offset: Vec2, impulse: Vec2) {
        self.velocity += impulse;
        self.angular_velocity += offset.perp_dot(impulse) / MOMENT_OF_INERTIA;
    }

    pub fn integrate(&mut self, physics: &PhysicsConfig, dt: f32) {
        self.velocity.y += physics.gravity * dt;
        self.velocity /= 1.0 + physics.linear_damping * dt;
        self.position += self.velocity * dt;

        self.angular_velocity /= 1.0 + physics.angular_damping * dt;
        self.rotate(self.angular_velocity * dt);
    }

    /// Rotates a body-space offset into world orientation (no translation).
    pub fn orient(&self, local: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + self.orient(local)
    }

    pub fn hull(&self) -> [Vec2; 5] {
        HULL.map(|p| self.to_world(p))
    }

    pub fn nozzle(&self) -> Vec2 {
        self.to_world(NOZZLE)
    }
}

fn wrap_angle(angle: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(tau);
    if wrapped > std::f32::consts::PI {
        wrapped - tau
    } else {
        wrapped
    }
}
