//! Sphere-vs-mesh boolean approximation.

use super::{ClothMesh, Sphere};

/// Boolean operations between a cloth mesh and a sphere.
pub trait MeshBoolean {
    /// The part of `mesh` outside `sphere`.
    fn subtract_sphere(&self, mesh: &ClothMesh, sphere: Sphere) -> ClothMesh;

    /// The part of `mesh` inside `sphere`.
    fn intersect_sphere(&self, mesh: &ClothMesh, sphere: Sphere) -> ClothMesh;
}

/// Classifies whole triangles by their centroid.
///
/// Triangles are never split, so the two results always partition the input:
/// every triangle lands in exactly one of `subtract_sphere` and
/// `intersect_sphere`. Cut edges follow the tessellation of the cloth.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereClip;

impl MeshBoolean for SphereClip {
    fn subtract_sphere(&self, mesh: &ClothMesh, sphere: Sphere) -> ClothMesh {
        mesh.select_triangles(|i| !sphere.contains(mesh.triangle_centroid(i)))
    }

    fn intersect_sphere(&self, mesh: &ClothMesh, sphere: Sphere) -> ClothMesh {
        mesh.select_triangles(|i| sphere.contains(mesh.triangle_centroid(i)))
    }
}
