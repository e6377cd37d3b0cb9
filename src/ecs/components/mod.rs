//! ECS components (transform, physics, cloth).

pub mod cloth;
pub mod physics;
pub mod transform;

pub use cloth::*;
pub use physics::*;
pub use transform::*;
