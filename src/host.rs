//! Host engine services the break pipeline calls into.
//!
//! The pipeline never owns scene objects. Surfaces, fragment bodies, timers,
//! and debug overlays live in the host and are addressed through the handle
//! types below. A host implements every trait; [`Host`] is blanket-implemented
//! for anything that does.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::ClothMesh;

/// Index of a material slot on a surface mesh.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MaterialId(pub u32);

/// Handle to a cloth-bearing surface owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Handle to a spawned fragment body owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub u64);

/// Handle to a hit-notification subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Spatial and material queries against a target surface.
pub trait ClothSurfaces {
    /// Whether the handle still refers to a live surface.
    fn is_surface_valid(&self, surface: SurfaceId) -> bool;

    /// Whether the surface carries a cloth simulation or clothing asset.
    fn has_cloth(&self, surface: SurfaceId) -> bool;

    /// Number of material slots on the surface mesh.
    fn material_count(&self, surface: SurfaceId) -> u32;

    /// Material of the surface point nearest to `point`, if the host can tell.
    fn nearest_material(&self, surface: SurfaceId, point: Vec3) -> Option<MaterialId>;

    /// Current posed geometry in world space, optionally restricted to one material.
    fn extract_posed_mesh(
        &self,
        surface: SurfaceId,
        material: Option<MaterialId>,
    ) -> Option<ClothMesh>;

    /// Receives what is left after a cut. `material` is the restriction the
    /// mesh was extracted with; triangles of other materials are untouched.
    fn replace_posed_mesh(
        &mut self,
        _surface: SurfaceId,
        _material: Option<MaterialId>,
        _mesh: ClothMesh,
    ) {
    }
}

/// Delivery of collision notifications from a surface.
pub trait HitNotifications {
    /// Start forwarding the surface's hits. Returns `None` if the surface cannot notify.
    fn subscribe_hits(&mut self, surface: SurfaceId) -> Option<SubscriptionId>;

    fn unsubscribe_hits(&mut self, subscription: SubscriptionId);
}

/// Creation and control of debris bodies.
pub trait FragmentBodies {
    /// Spawn a collidable sphere primitive.
    fn spawn_primitive(
        &mut self,
        location: Vec3,
        radius: f32,
        material: Option<MaterialId>,
    ) -> Option<FragmentId>;

    /// Bake a world-space mesh into a standalone collidable body.
    fn bake_mesh(&mut self, mesh: &ClothMesh, material: Option<MaterialId>) -> Option<FragmentId>;

    /// Turn on rigid-body simulation with the given mass.
    fn enable_physics(&mut self, fragment: FragmentId, mass: f32) -> bool;

    /// Apply an impulse expressed as a velocity change.
    fn apply_impulse(&mut self, fragment: FragmentId, impulse: Vec3);

    /// Destroy the body. Returns false if it was already gone.
    fn destroy(&mut self, fragment: FragmentId) -> bool;

    fn is_alive(&self, fragment: FragmentId) -> bool;
}

/// One-shot delayed callbacks.
///
/// When the delay elapses the host hands `fragment` back to the owning
/// controller's expiry hook. Nothing is ever cancelled.
pub trait Timers {
    fn schedule_once(&mut self, delay: f32, fragment: FragmentId);
}

/// Diagnostic overlay. Never required for correctness.
pub trait DebugDraw {
    fn draw_sphere(&mut self, _center: Vec3, _radius: f32, _color: [f32; 4], _duration: f32) {}

    fn draw_text(&mut self, _location: Vec3, _text: &str, _color: [f32; 4], _duration: f32) {}
}

/// Everything the pipeline needs from the engine.
pub trait Host: ClothSurfaces + HitNotifications + FragmentBodies + Timers + DebugDraw {}

impl<T> Host for T where T: ClothSurfaces + HitNotifications + FragmentBodies + Timers + DebugDraw {}

/// Common overlay colors.
pub mod colors {
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
