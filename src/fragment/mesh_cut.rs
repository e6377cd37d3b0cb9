//! Debris cut out of the posed cloth mesh.
//!
//! The impact sphere splits the surface into what stays and what is blown
//! out. The blown-out region becomes the first fragment; smaller spheres
//! sampled inside it carve additional sub-pieces. Sub-pieces may overlap each
//! other and the main piece.

use rand::rngs::SmallRng;

use super::{sampling, select_material, FragmentStrategy, GenerateRequest, SpawnedPiece};
use crate::geometry::{ClothMesh, MeshBoolean, Sphere, SphereClip};
use crate::host::{Host, MaterialId};

pub struct MeshCutStrategy {
    boolean: Box<dyn MeshBoolean>,
    spawn_radius_factor: f32,
    max_sub_pieces: u32,
}

impl Default for MeshCutStrategy {
    fn default() -> Self {
        Self::new(0.8, 10)
    }
}

impl MeshCutStrategy {
    pub fn new(spawn_radius_factor: f32, max_sub_pieces: u32) -> Self {
        Self::with_boolean(Box::new(SphereClip), spawn_radius_factor, max_sub_pieces)
    }

    pub fn with_boolean(
        boolean: Box<dyn MeshBoolean>,
        spawn_radius_factor: f32,
        max_sub_pieces: u32,
    ) -> Self {
        Self {
            boolean,
            spawn_radius_factor: spawn_radius_factor.clamp(0.0, 1.0),
            max_sub_pieces,
        }
    }

    fn bake(
        host: &mut dyn Host,
        piece: &ClothMesh,
        fallback: Option<MaterialId>,
    ) -> Option<SpawnedPiece> {
        let location = piece.center()?;
        let size = piece.bounding_radius();
        if size <= 0.0 {
            return None;
        }
        let material = piece.materials.first().copied().or(fallback);
        let id = host.bake_mesh(piece, material)?;
        Some(SpawnedPiece {
            id,
            location,
            size,
            material,
        })
    }
}

impl FragmentStrategy for MeshCutStrategy {
    fn name(&self) -> &'static str {
        "mesh-cut"
    }

    fn spawn(
        &mut self,
        host: &mut dyn Host,
        request: &GenerateRequest,
        count: u32,
        rng: &mut SmallRng,
    ) -> Vec<SpawnedPiece> {
        let Some(mesh) = host.extract_posed_mesh(request.surface, request.material_filter) else {
            tracing::warn!("surface {:?} has no posed mesh to cut", request.surface);
            return Vec::new();
        };
        let mesh = mesh.sanitized();

        let impact = Sphere::new(request.location, request.radius);
        let removed = self.boolean.intersect_sphere(&mesh, impact);
        if removed.is_empty() {
            tracing::debug!("impact sphere at {} missed the cloth", request.location);
            return Vec::new();
        }
        let remaining = self.boolean.subtract_sphere(&mesh, impact);
        host.replace_posed_mesh(request.surface, request.material_filter, remaining);

        let fallback = select_material(host, request.surface, request.material_filter);
        let scatter = request.radius * self.spawn_radius_factor;
        let sub_pieces = count.saturating_sub(1).min(self.max_sub_pieces);

        let mut pieces = Vec::with_capacity(1 + sub_pieces as usize);
        pieces.extend(Self::bake(host, &removed, fallback));

        for _ in 0..sub_pieces {
            let size = sampling::size_in(rng, &request.size_range);
            if size <= 0.0 {
                continue;
            }
            let center = request.location + sampling::offset_in_ball(rng, scatter);
            let piece = self
                .boolean
                .intersect_sphere(&removed, Sphere::new(center, size));
            if piece.is_empty() {
                continue;
            }
            pieces.extend(Self::bake(host, &piece, fallback));
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::SeedableRng;

    use super::*;
    use crate::fragment::FragmentPhysics;
    use crate::host::SurfaceId;
    use crate::testing::MockHost;

    const SURFACE: SurfaceId = SurfaceId(4);

    fn request(location: Vec3, filter: Option<MaterialId>) -> GenerateRequest {
        GenerateRequest {
            surface: SURFACE,
            location,
            radius: 30.0,
            material_filter: filter,
            count_range: 1..=1,
            size_range: 10.0..=20.0,
            physics: FragmentPhysics {
                enabled: true,
                mass: 1.0,
                lifetime: 5.0,
            },
        }
    }

    #[test]
    fn test_cut_removes_impact_region() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut rng = SmallRng::seed_from_u64(21);
        let total = host.surfaces[&SURFACE].mesh.triangle_count();

        let pieces =
            MeshCutStrategy::default().spawn(&mut host, &request(Vec3::ZERO, None), 1, &mut rng);
        assert_eq!(pieces.len(), 1);

        let main = &host.bodies[&pieces[0].id];
        assert!(main.baked_triangles > 0);
        assert_eq!(host.replaced.len(), 1);
        let (surface, remaining) = host.replaced[0];
        assert_eq!(surface, SURFACE);
        assert_eq!(remaining + main.baked_triangles, total);
        // Edge triangles poke out of the sphere by at most one cell.
        assert!(pieces[0].size < 40.0);
    }

    #[test]
    fn test_sub_pieces_bounded() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut rng = SmallRng::seed_from_u64(8);
        let pieces =
            MeshCutStrategy::default().spawn(&mut host, &request(Vec3::ZERO, None), 20, &mut rng);
        assert!(!pieces.is_empty());
        assert!(pieces.len() <= 11);
        assert!(pieces.iter().all(|p| host.bodies[&p.id].baked_triangles > 0));
    }

    #[test]
    fn test_material_filter_restricts_cut() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut rng = SmallRng::seed_from_u64(2);
        let pieces = MeshCutStrategy::default().spawn(
            &mut host,
            &request(Vec3::ZERO, Some(MaterialId(1))),
            4,
            &mut rng,
        );
        assert!(!pieces.is_empty());
        assert!(pieces.iter().all(|p| p.material == Some(MaterialId(1))));
    }

    #[test]
    fn test_cut_survives_inconsistent_host_mesh() {
        let mut host = MockHost::with_panel(SURFACE);
        if let Some(surface) = host.surfaces.get_mut(&SURFACE) {
            surface.mesh.materials.clear();
            surface.mesh.triangles.push([0, 1, 1_000_000]);
        }
        let total = host.surfaces[&SURFACE].mesh.triangle_count() - 1;
        let mut rng = SmallRng::seed_from_u64(5);

        let pieces =
            MeshCutStrategy::default().spawn(&mut host, &request(Vec3::ZERO, None), 3, &mut rng);
        assert!(!pieces.is_empty());
        let (_, remaining) = host.replaced[0];
        let main = &host.bodies[&pieces[0].id];
        assert_eq!(remaining + main.baked_triangles, total);
        assert!(pieces.iter().all(|p| p.material == Some(MaterialId(0))));
    }

    #[test]
    fn test_miss_produces_nothing() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut rng = SmallRng::seed_from_u64(2);
        let far = Vec3::new(0.0, 0.0, 500.0);
        let pieces = MeshCutStrategy::default().spawn(&mut host, &request(far, None), 5, &mut rng);
        assert!(pieces.is_empty());
        assert!(host.replaced.is_empty());
    }
}
