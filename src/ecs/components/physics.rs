//! Physics components for fragment entities.

use glam::Vec3;

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by gravity and impulses.
    Dynamic,
    /// Stays where it was spawned.
    Kinematic,
}

/// Rigid body component.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub mass: f32,
    pub linear_velocity: Vec3,
    pub force_accumulator: Vec3,
    /// Fraction of velocity lost per step (default: 0.01).
    pub linear_damping: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
}

impl RigidBody {
    /// A simulated body with the given mass.
    pub fn new_dynamic(mass: f32) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            mass,
            linear_velocity: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            linear_damping: 0.01,
            gravity_scale: 1.0,
        }
    }

    /// A body that only moves when told to. Fragments start this way.
    pub fn new_kinematic() -> Self {
        Self {
            body_type: RigidBodyType::Kinematic,
            mass: 0.0,
            linear_velocity: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            linear_damping: 0.0,
            gravity_scale: 0.0,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic && self.mass > 0.0
    }
}

/// Collider shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Bounds of a baked cloth piece.
    Box { half_extents: Vec3 },
}

/// Collision shape of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Offset from the entity's transform origin.
    pub offset: Vec3,
}

impl Collider {
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            offset: Vec3::ZERO,
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Box { half_extents },
            offset: Vec3::ZERO,
        }
    }
}
