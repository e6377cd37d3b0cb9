//! ECS systems.

pub mod physics;

pub use physics::{fragment_physics_system, PhysicsSettings};
