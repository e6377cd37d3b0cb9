//! Fragment motion: gravity, semi-implicit Euler, damping.

use glam::Vec3;

use crate::ecs::components::{FragmentTag, GlobalTransform, RigidBody, Transform};

/// World-wide physics parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    /// Default: 980 units/s² along -Z (centimetre scale, Z up).
    pub gravity: Vec3,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -980.0),
        }
    }
}

/// Advance every fragment by `dt` seconds.
pub fn fragment_physics_system(world: &mut hecs::World, settings: &PhysicsSettings, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    apply_gravity(world, settings.gravity);
    integrate_velocities(world, dt);
    integrate_positions(world, dt);
    sync_transforms(world);
    clear_forces(world);
    age_fragments(world, dt);
}

/// Accumulate gravity on dynamic bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec3) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if rb.is_dynamic() {
            rb.force_accumulator += gravity * rb.mass * rb.gravity_scale;
        }
    }
}

/// v += (F/m) * dt, then damping.
pub fn integrate_velocities(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if !rb.is_dynamic() {
            continue;
        }
        rb.linear_velocity += rb.force_accumulator / rb.mass * dt;
        rb.linear_velocity *= (1.0 - rb.linear_damping).max(0.0);
    }
}

/// p += v * dt.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, (rb, transform)) in world.query_mut::<(&RigidBody, &mut Transform)>() {
        if rb.is_dynamic() {
            transform.position += rb.linear_velocity * dt;
        }
    }
}

pub fn sync_transforms(world: &mut hecs::World) {
    for (_, (transform, global)) in world.query_mut::<(&Transform, &mut GlobalTransform)>() {
        global.0 = transform.to_matrix();
    }
}

pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        rb.force_accumulator = Vec3::ZERO;
    }
}

fn age_fragments(world: &mut hecs::World, dt: f32) {
    for (_, tag) in world.query_mut::<&mut FragmentTag>() {
        tag.age += dt;
    }
}
