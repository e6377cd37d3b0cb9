//! Recording host used by unit tests.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;

use crate::geometry::ClothMesh;
use crate::host::{
    ClothSurfaces, DebugDraw, FragmentBodies, FragmentId, HitNotifications, MaterialId,
    SubscriptionId, SurfaceId, Timers,
};

pub struct MockSurface {
    pub mesh: ClothMesh,
    pub material_count: u32,
    pub has_cloth: bool,
    pub notifies: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockBody {
    pub location: Vec3,
    pub size: f32,
    pub material: Option<MaterialId>,
    pub baked_triangles: usize,
    pub mass: Option<f32>,
    pub impulse: Vec3,
}

#[derive(Default)]
pub struct MockHost {
    pub surfaces: HashMap<SurfaceId, MockSurface>,
    pub bodies: BTreeMap<FragmentId, MockBody>,
    pub destroyed: Vec<FragmentId>,
    pub timers: Vec<(f32, FragmentId)>,
    pub subscriptions: Vec<(SubscriptionId, SurfaceId)>,
    pub replaced: Vec<(SurfaceId, usize)>,
    pub spheres_drawn: usize,
    pub labels: Vec<String>,
    /// Make `enable_physics` fail.
    pub refuse_physics: bool,
    next_id: u64,
}

impl MockHost {
    /// Host with one 200 x 200 cloth panel centred at the origin using
    /// materials 0 (left half) and 1 (right half).
    pub fn with_panel(surface: SurfaceId) -> Self {
        let mut mesh = ClothMesh::panel(Vec3::ZERO, 200.0, 200.0, 40, 40, MaterialId(0));
        for i in 0..mesh.triangle_count() {
            if mesh.triangle_centroid(i).x > 0.0 {
                mesh.materials[i] = MaterialId(1);
            }
        }
        let mut host = Self::default();
        host.surfaces.insert(
            surface,
            MockSurface {
                mesh,
                material_count: 2,
                has_cloth: true,
                notifies: true,
            },
        );
        host
    }

    pub fn live_bodies(&self) -> usize {
        self.bodies.len()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ClothSurfaces for MockHost {
    fn is_surface_valid(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    fn has_cloth(&self, surface: SurfaceId) -> bool {
        self.surfaces.get(&surface).is_some_and(|s| s.has_cloth)
    }

    fn material_count(&self, surface: SurfaceId) -> u32 {
        self.surfaces.get(&surface).map_or(0, |s| s.material_count)
    }

    fn nearest_material(&self, surface: SurfaceId, point: Vec3) -> Option<MaterialId> {
        self.surfaces.get(&surface)?.mesh.nearest_material(point)
    }

    fn extract_posed_mesh(
        &self,
        surface: SurfaceId,
        material: Option<MaterialId>,
    ) -> Option<ClothMesh> {
        let mesh = &self.surfaces.get(&surface)?.mesh;
        Some(match material {
            Some(m) => mesh.filter_material(m),
            None => mesh.clone(),
        })
    }

    fn replace_posed_mesh(
        &mut self,
        surface: SurfaceId,
        _material: Option<MaterialId>,
        mesh: ClothMesh,
    ) {
        self.replaced.push((surface, mesh.triangle_count()));
    }
}

impl HitNotifications for MockHost {
    fn subscribe_hits(&mut self, surface: SurfaceId) -> Option<SubscriptionId> {
        if !self.surfaces.get(&surface)?.notifies {
            return None;
        }
        let id = SubscriptionId(self.next());
        self.subscriptions.push((id, surface));
        Some(id)
    }

    fn unsubscribe_hits(&mut self, subscription: SubscriptionId) {
        self.subscriptions.retain(|(id, _)| *id != subscription);
    }
}

impl FragmentBodies for MockHost {
    fn spawn_primitive(
        &mut self,
        location: Vec3,
        radius: f32,
        material: Option<MaterialId>,
    ) -> Option<FragmentId> {
        let id = FragmentId(self.next());
        self.bodies.insert(
            id,
            MockBody {
                location,
                size: radius,
                material,
                baked_triangles: 0,
                mass: None,
                impulse: Vec3::ZERO,
            },
        );
        Some(id)
    }

    fn bake_mesh(&mut self, mesh: &ClothMesh, material: Option<MaterialId>) -> Option<FragmentId> {
        let id = FragmentId(self.next());
        self.bodies.insert(
            id,
            MockBody {
                location: mesh.center()?,
                size: mesh.bounding_radius(),
                material,
                baked_triangles: mesh.triangle_count(),
                mass: None,
                impulse: Vec3::ZERO,
            },
        );
        Some(id)
    }

    fn enable_physics(&mut self, fragment: FragmentId, mass: f32) -> bool {
        if self.refuse_physics {
            return false;
        }
        match self.bodies.get_mut(&fragment) {
            Some(body) => {
                body.mass = Some(mass);
                true
            }
            None => false,
        }
    }

    fn apply_impulse(&mut self, fragment: FragmentId, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&fragment) {
            body.impulse += impulse;
        }
    }

    fn destroy(&mut self, fragment: FragmentId) -> bool {
        self.destroyed.push(fragment);
        self.bodies.remove(&fragment).is_some()
    }

    fn is_alive(&self, fragment: FragmentId) -> bool {
        self.bodies.contains_key(&fragment)
    }
}

impl Timers for MockHost {
    fn schedule_once(&mut self, delay: f32, fragment: FragmentId) {
        self.timers.push((delay, fragment));
    }
}

impl DebugDraw for MockHost {
    fn draw_sphere(&mut self, _center: Vec3, _radius: f32, _color: [f32; 4], _duration: f32) {
        self.spheres_drawn += 1;
    }

    fn draw_text(&mut self, _location: Vec3, text: &str, _color: [f32; 4], _duration: f32) {
        self.labels.push(text.to_string());
    }
}
