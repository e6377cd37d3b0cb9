//! Cloth surface and fragment components.

use crate::geometry::ClothMesh;
use crate::host::MaterialId;

/// A breakable cloth surface. `mesh` is the posed geometry in world space.
#[derive(Debug, Clone)]
pub struct ClothSurface {
    pub mesh: ClothMesh,
    pub material_count: u32,
    /// Whether a cloth simulation or clothing asset is present.
    pub simulated: bool,
    /// Whether the surface reports collisions.
    pub notify_hits: bool,
}

impl ClothSurface {
    pub fn new(mesh: ClothMesh) -> Self {
        let material_count = mesh
            .material_ids()
            .iter()
            .next_back()
            .map_or(0, |m| m.0 + 1);
        Self {
            mesh,
            material_count,
            simulated: true,
            notify_hits: true,
        }
    }
}

/// Marks a debris entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentTag {
    pub material: Option<MaterialId>,
    /// Seconds since spawn.
    pub age: f32,
}

/// Geometry of a baked fragment, relative to its transform.
#[derive(Debug, Clone)]
pub struct BakedMesh(pub ClothMesh);
