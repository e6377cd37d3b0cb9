//! Reference host built on a hecs world.
//!
//! Surfaces and fragments are entities. [`EcsHost`] implements every host
//! trait over the world, runs a small fragment physics step, and keeps its
//! own [`FrameTimers`](crate::timer::FrameTimers) and
//! [`DebugLines`](crate::debug::DebugLines).

pub mod components;
pub mod host;
pub mod systems;

pub use host::EcsHost;

pub mod prelude {
    pub use super::components::*;
    pub use super::host::EcsHost;
    pub use super::systems::{fragment_physics_system, PhysicsSettings};
}
