//! [`EcsHost`]: every host service over one hecs world.

use std::collections::HashMap;

use glam::Vec3;

use crate::debug::DebugLines;
use crate::ecs::components::{
    BakedMesh, ClothSurface, Collider, FragmentTag, GlobalTransform, RigidBody, Transform,
};
use crate::ecs::systems::{fragment_physics_system, PhysicsSettings};
use crate::geometry::ClothMesh;
use crate::host::{
    ClothSurfaces, DebugDraw, FragmentBodies, FragmentId, HitNotifications, MaterialId,
    SubscriptionId, SurfaceId, Timers,
};
use crate::timer::FrameTimers;

/// Host backed by a hecs world. Handles are entity bits.
pub struct EcsHost {
    pub world: hecs::World,
    pub physics: PhysicsSettings,
    pub timers: FrameTimers,
    pub debug: DebugLines,
    subscriptions: HashMap<SubscriptionId, hecs::Entity>,
    next_subscription: u64,
}

impl Default for EcsHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EcsHost {
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            physics: PhysicsSettings::default(),
            timers: FrameTimers::new(),
            debug: DebugLines::new(),
            subscriptions: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// Add a cloth surface entity.
    pub fn spawn_surface(&mut self, surface: ClothSurface) -> SurfaceId {
        let entity = self.world.spawn((
            Transform::identity(),
            GlobalTransform::default(),
            surface,
        ));
        SurfaceId(entity.to_bits().get())
    }

    /// Despawn a surface. Its handle becomes invalid.
    pub fn despawn_surface(&mut self, surface: SurfaceId) -> bool {
        match self.surface_entity(surface) {
            Some(entity) => {
                self.subscriptions.retain(|_, e| *e != entity);
                self.world.despawn(entity).is_ok()
            }
            None => false,
        }
    }

    pub fn surface_mesh(&self, surface: SurfaceId) -> Option<ClothMesh> {
        let entity = self.surface_entity(surface)?;
        let cloth = self.world.get::<&ClothSurface>(entity).ok()?;
        Some(cloth.mesh.clone())
    }

    /// Whether a hit subscription exists for the surface.
    pub fn is_subscribed(&self, surface: SurfaceId) -> bool {
        self.surface_entity(surface)
            .is_some_and(|entity| self.subscriptions.values().any(|e| *e == entity))
    }

    pub fn fragment_count(&self) -> usize {
        self.world.query::<&FragmentTag>().iter().count()
    }

    pub fn fragment_position(&self, fragment: FragmentId) -> Option<Vec3> {
        let entity = self.fragment_entity(fragment)?;
        let transform = self.world.get::<&Transform>(entity).ok()?;
        Some(transform.position)
    }

    pub fn fragment_velocity(&self, fragment: FragmentId) -> Option<Vec3> {
        let entity = self.fragment_entity(fragment)?;
        let rb = self.world.get::<&RigidBody>(entity).ok()?;
        Some(rb.linear_velocity)
    }

    /// Advance physics, overlays, and timers by `dt`. Returns fragments
    /// whose disposal timer fired; hand them to their controller.
    pub fn step(&mut self, dt: f32) -> Vec<FragmentId> {
        fragment_physics_system(&mut self.world, &self.physics, dt);
        self.debug.expire(dt);
        self.timers.advance(dt)
    }

    fn surface_entity(&self, surface: SurfaceId) -> Option<hecs::Entity> {
        let entity = hecs::Entity::from_bits(surface.0)?;
        self.world
            .satisfies::<&ClothSurface>(entity)
            .unwrap_or(false)
            .then_some(entity)
    }

    fn fragment_entity(&self, fragment: FragmentId) -> Option<hecs::Entity> {
        let entity = hecs::Entity::from_bits(fragment.0)?;
        self.world
            .satisfies::<&FragmentTag>(entity)
            .unwrap_or(false)
            .then_some(entity)
    }

    fn spawn_fragment(
        &mut self,
        location: Vec3,
        collider: Collider,
        material: Option<MaterialId>,
    ) -> hecs::Entity {
        let transform = Transform::from_position(location);
        self.world.spawn((
            transform,
            GlobalTransform(transform.to_matrix()),
            RigidBody::new_kinematic(),
            collider,
            FragmentTag { material, age: 0.0 },
        ))
    }
}

impl ClothSurfaces for EcsHost {
    fn is_surface_valid(&self, surface: SurfaceId) -> bool {
        self.surface_entity(surface).is_some()
    }

    fn has_cloth(&self, surface: SurfaceId) -> bool {
        self.surface_entity(surface)
            .and_then(|e| self.world.get::<&ClothSurface>(e).ok().map(|c| c.simulated))
            .unwrap_or(false)
    }

    fn material_count(&self, surface: SurfaceId) -> u32 {
        self.surface_entity(surface)
            .and_then(|e| {
                self.world
                    .get::<&ClothSurface>(e)
                    .ok()
                    .map(|c| c.material_count)
            })
            .unwrap_or(0)
    }

    fn nearest_material(&self, surface: SurfaceId, point: Vec3) -> Option<MaterialId> {
        let entity = self.surface_entity(surface)?;
        let cloth = self.world.get::<&ClothSurface>(entity).ok()?;
        cloth.mesh.nearest_material(point)
    }

    fn extract_posed_mesh(
        &self,
        surface: SurfaceId,
        material: Option<MaterialId>,
    ) -> Option<ClothMesh> {
        let entity = self.surface_entity(surface)?;
        let cloth = self.world.get::<&ClothSurface>(entity).ok()?;
        Some(match material {
            Some(m) => cloth.mesh.filter_material(m),
            None => cloth.mesh.clone(),
        })
    }

    fn replace_posed_mesh(
        &mut self,
        surface: SurfaceId,
        material: Option<MaterialId>,
        mesh: ClothMesh,
    ) {
        let Some(entity) = self.surface_entity(surface) else {
            return;
        };
        let Ok(mut cloth) = self.world.get::<&mut ClothSurface>(entity) else {
            return;
        };
        cloth.mesh = match material {
            None => mesh,
            Some(m) => {
                let mut kept = cloth
                    .mesh
                    .select_triangles(|i| cloth.mesh.triangle_material(i) != m);
                kept.append(&mesh);
                kept
            }
        };
    }
}

impl HitNotifications for EcsHost {
    fn subscribe_hits(&mut self, surface: SurfaceId) -> Option<SubscriptionId> {
        let entity = self.surface_entity(surface)?;
        let notifies = self
            .world
            .get::<&ClothSurface>(entity)
            .ok()
            .is_some_and(|c| c.notify_hits);
        if !notifies {
            return None;
        }
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscriptions.insert(id, entity);
        Some(id)
    }

    fn unsubscribe_hits(&mut self, subscription: SubscriptionId) {
        self.subscriptions.remove(&subscription);
    }
}

impl FragmentBodies for EcsHost {
    fn spawn_primitive(
        &mut self,
        location: Vec3,
        radius: f32,
        material: Option<MaterialId>,
    ) -> Option<FragmentId> {
        let entity = self.spawn_fragment(location, Collider::sphere(radius), material);
        Some(FragmentId(entity.to_bits().get()))
    }

    fn bake_mesh(&mut self, mesh: &ClothMesh, material: Option<MaterialId>) -> Option<FragmentId> {
        let center = mesh.center()?;
        let local = mesh.translated(-center);
        let half_extents = local.bounds()?.half_extents();
        let entity = self.spawn_fragment(center, Collider::cuboid(half_extents), material);
        self.world.insert_one(entity, BakedMesh(local)).ok()?;
        Some(FragmentId(entity.to_bits().get()))
    }

    fn enable_physics(&mut self, fragment: FragmentId, mass: f32) -> bool {
        let Some(entity) = self.fragment_entity(fragment) else {
            return false;
        };
        match self.world.get::<&mut RigidBody>(entity) {
            Ok(mut rb) => {
                let velocity = rb.linear_velocity;
                *rb = RigidBody::new_dynamic(mass);
                rb.linear_velocity = velocity;
                true
            }
            Err(_) => false,
        }
    }

    fn apply_impulse(&mut self, fragment: FragmentId, impulse: Vec3) {
        let Some(entity) = self.fragment_entity(fragment) else {
            return;
        };
        if let Ok(mut rb) = self.world.get::<&mut RigidBody>(entity) {
            rb.linear_velocity += impulse;
        }
    }

    fn destroy(&mut self, fragment: FragmentId) -> bool {
        match self.fragment_entity(fragment) {
            Some(entity) => self.world.despawn(entity).is_ok(),
            None => false,
        }
    }

    fn is_alive(&self, fragment: FragmentId) -> bool {
        self.fragment_entity(fragment).is_some()
    }
}

impl Timers for EcsHost {
    fn schedule_once(&mut self, delay: f32, fragment: FragmentId) {
        self.timers.schedule_once(delay, fragment);
    }
}

impl DebugDraw for EcsHost {
    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: [f32; 4], duration: f32) {
        self.debug.draw_sphere(center, radius, color, duration);
    }

    fn draw_text(&mut self, location: Vec3, text: &str, color: [f32; 4], duration: f32) {
        self.debug.draw_text(location, text, color, duration);
    }
}
