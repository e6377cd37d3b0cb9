//! Cloth Break
//!
//! Turns projectile impacts on cloth surfaces into short-lived debris.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **host** - Traits the engine implements (surfaces, bodies, timers, debug draw)
//! 2. **geometry** - Cloth meshes and sphere booleans
//! 3. **impact** - Collision event to break radius and impact force
//! 4. **policy** - Thresholds, fragment parameters, material allow-list
//! 5. **fragment** - Fragment generation strategies and the live-fragment registry
//! 6. **controller** - Per-surface break pipeline and break events
//! 7. **library** - Flat designer-facing operations over many surfaces
//! 8. **timer** / **debug** - Frame-driven timers and a recorded overlay
//! 9. **ecs** - Reference host on a hecs world (feature = "ecs")

pub mod controller;
pub mod debug;
pub mod error;
pub mod fragment;
pub mod geometry;
pub mod host;
pub mod impact;
pub mod library;
pub mod policy;
pub mod timer;

#[cfg(feature = "ecs")]
pub mod ecs;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use controller::{
    BreakEvent, BreakableCloth, ControllerConfig, ControllerState, SourceFilter,
};
pub use debug::{DebugLines, LineVertex};
pub use error::{BreakError, BreakResult, Severity};
pub use fragment::{
    Fragment, FragmentGenerator, FragmentPhysics, FragmentRegistry, FragmentStrategy,
    GenerateRequest, GeneratorConfig, MeshCutStrategy, PrimitiveStrategy, StrategyKind,
};
pub use geometry::{Aabb, ClothMesh, ClothVertex, MeshBoolean, Sphere, SphereClip};
pub use host::{
    ClothSurfaces, DebugDraw, FragmentBodies, FragmentId, HitNotifications, Host, MaterialId,
    SubscriptionId, SurfaceId, Timers,
};
pub use impact::{
    BodyState, CollisionEvent, DebugSettings, ImpactEvaluator, ImpactResult, ImpactSource,
    SourceShape,
};
pub use library::ClothBreakSystem;
pub use policy::BreakPolicy;
pub use timer::FrameTimers;

#[cfg(feature = "ecs")]
pub use ecs::prelude::*;

// Re-export glam for convenience
pub use glam;
