//! Shared setup helpers for cloth-break benchmarks.
//!
//! ## Running
//!
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench fragments
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench fragments -- generate

use cloth_break::ecs::components::ClothSurface;
use cloth_break::{
    ClothMesh, CollisionEvent, EcsHost, FragmentPhysics, GenerateRequest, ImpactSource,
    MaterialId, SurfaceId,
};
use glam::Vec3;

/// Square panel of `cells x cells` quads, 200 units wide, centred at the origin.
pub fn panel(cells: u32) -> ClothMesh {
    ClothMesh::panel(Vec3::ZERO, 200.0, 200.0, cells, cells, MaterialId(0))
}

/// Host holding one panel surface.
pub fn setup_panel_host(cells: u32) -> (EcsHost, SurfaceId) {
    let mut host = EcsHost::new();
    let surface = host.spawn_surface(ClothSurface::new(panel(cells)));
    (host, surface)
}

/// Fast projectile hitting the centre of `surface`.
pub fn bullet_hit(surface: SurfaceId) -> CollisionEvent {
    let source = ImpactSource::projectile("Bullet", 5.0, Vec3::new(0.0, 0.0, -8000.0), 2.0);
    CollisionEvent::new(surface, Vec3::ZERO, source)
}

/// Request for `count` fragments around the panel centre.
pub fn request(surface: SurfaceId, count: u32) -> GenerateRequest {
    GenerateRequest {
        surface,
        location: Vec3::ZERO,
        radius: 20.0,
        material_filter: None,
        count_range: count..=count,
        size_range: 5.0..=20.0,
        physics: FragmentPhysics {
            enabled: true,
            mass: 1.0,
            lifetime: 5.0,
        },
    }
}
