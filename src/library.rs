//! Designer-facing operations keyed by surface.
//!
//! [`ClothBreakSystem`] owns one [`BreakableCloth`] per surface and exposes
//! flat operations that report success as `bool` and log failures instead of
//! returning them. Configuration operations create a controller for the
//! surface when none exists yet; trigger operations require one.

use std::collections::HashMap;

use glam::Vec3;

use crate::controller::{BreakableCloth, ControllerConfig};
use crate::error::{BreakError, BreakResult};
use crate::host::{FragmentId, Host, MaterialId, SurfaceId};
use crate::impact::CollisionEvent;
use crate::policy::BreakPolicy;

/// Log a failed result and collapse it to `bool`.
fn settle<T>(operation: &str, result: BreakResult<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            err.report(operation);
            false
        }
    }
}

/// Breakable surfaces managed by name-free handles.
#[derive(Default)]
pub struct ClothBreakSystem {
    controllers: HashMap<SurfaceId, BreakableCloth>,
    default_policy: BreakPolicy,
    default_config: ControllerConfig,
}

impl ClothBreakSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy and configuration given to controllers created from now on.
    pub fn with_defaults(policy: BreakPolicy, config: ControllerConfig) -> Self {
        Self {
            controllers: HashMap::new(),
            default_policy: policy,
            default_config: config,
        }
    }

    pub fn controller(&self, surface: SurfaceId) -> Option<&BreakableCloth> {
        self.controllers.get(&surface)
    }

    pub fn controller_mut(&mut self, surface: SurfaceId) -> Option<&mut BreakableCloth> {
        self.controllers.get_mut(&surface)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.controllers.keys().copied()
    }

    /// Make `surface` breakable, reusing its controller if it has one.
    pub fn attach_to_surface(&mut self, host: &mut dyn Host, surface: SurfaceId) -> bool {
        settle("attach_to_surface", self.ensure(host, surface).map(|_| ()))
    }

    /// Tear down and forget the surface's controller.
    pub fn detach(&mut self, host: &mut dyn Host, surface: SurfaceId) -> bool {
        match self.controllers.remove(&surface) {
            Some(mut cloth) => {
                cloth.teardown(host);
                true
            }
            None => false,
        }
    }

    pub fn set_material_breakable(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        material: MaterialId,
        breakable: bool,
    ) -> bool {
        let result = self.ensure(host, surface).map(|cloth| {
            if cloth.policy_mut().set_material_breakable(material, breakable) {
                let verb = if breakable { "added" } else { "removed" };
                tracing::info!("{verb} breakable material {} on {surface:?}", material.0);
            }
        });
        settle("set_material_breakable", result)
    }

    /// Allow every material slot the surface has.
    pub fn set_all_materials_breakable(&mut self, host: &mut dyn Host, surface: SurfaceId) -> bool {
        let count = host.material_count(surface);
        let result = self.ensure(host, surface).map(|cloth| {
            cloth
                .policy_mut()
                .set_all_materials_breakable((0..count).map(MaterialId));
            tracing::info!("all {count} materials on {surface:?} set breakable");
        });
        settle("set_all_materials_breakable", result)
    }

    pub fn set_break_parameters(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        threshold: f32,
        min_count: u32,
        max_count: u32,
        min_size: f32,
        max_size: f32,
    ) -> bool {
        let result = self.ensure(host, surface).map(|cloth| {
            let policy = cloth.policy_mut();
            policy.set_break_parameters(threshold, min_count, max_count, min_size, max_size);
            tracing::info!(
                "break parameters on {surface:?}: force={:.1}, count={:?}, size={:?}",
                policy.break_force_threshold(),
                policy.fragment_count_range(),
                policy.fragment_size_range()
            );
        });
        settle("set_break_parameters", result)
    }

    pub fn set_bullet_parameters(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        radius_multiplier: f32,
    ) -> bool {
        let result = self.ensure(host, surface).map(|cloth| {
            cloth.policy_mut().set_radius_multiplier(radius_multiplier);
        });
        settle("set_bullet_parameters", result)
    }

    pub fn set_fragment_physics_parameters(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        enabled: bool,
        mass: f32,
        lifetime: f32,
    ) -> bool {
        let result = self.ensure(host, surface).map(|cloth| {
            cloth.policy_mut().set_fragment_physics(enabled, mass, lifetime);
        });
        settle("set_fragment_physics_parameters", result)
    }

    pub fn enable_debug_visualization(
        &mut self,
        surface: SurfaceId,
        enabled: bool,
        duration: f32,
    ) -> bool {
        let result = self
            .existing(surface)
            .and_then(|cloth| cloth.evaluator_mut().ok_or(BreakError::Uninitialized))
            .map(|evaluator| evaluator.set_debug_visualization(enabled, duration));
        settle("enable_debug_visualization", result)
    }

    /// Break at `location` with the default manual force.
    pub fn force_break_at_location(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        location: Vec3,
        radius: f32,
    ) -> bool {
        let result = self
            .existing(surface)
            .and_then(|cloth| cloth.force_break_at_location(host, location, radius, None));
        settle("force_break_at_location", result)
    }

    pub fn simulate_impact(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        location: Vec3,
        source_size: f32,
        impact_force: f32,
    ) -> bool {
        let result = self.existing(surface).and_then(|cloth| {
            cloth.simulate_impact(host, location, source_size, impact_force)
        });
        settle("simulate_impact", result)
    }

    /// Run a hit through the surface's pipeline without source filtering.
    pub fn handle_hit(
        &mut self,
        host: &mut dyn Host,
        surface: SurfaceId,
        event: &CollisionEvent,
    ) -> bool {
        let result = self
            .existing(surface)
            .and_then(|cloth| cloth.handle_hit(host, event));
        settle("handle_hit", result)
    }

    /// Route a hit notification to the controller of the surface it names.
    ///
    /// Sources that are not projectiles are dropped quietly.
    pub fn dispatch_collision(&mut self, host: &mut dyn Host, event: &CollisionEvent) -> bool {
        let Some(surface) = event.surface else {
            BreakError::NoSurface.report("collision");
            return false;
        };
        let result = self
            .existing(surface)
            .and_then(|cloth| cloth.handle_collision(host, event));
        match result {
            Err(BreakError::NotProjectile) => false,
            other => settle("collision", other),
        }
    }

    /// Timer callback: hand an expired fragment back to whoever owns it.
    pub fn on_fragment_expired(&mut self, host: &mut dyn Host, fragment: FragmentId) -> bool {
        self.controllers
            .values_mut()
            .find(|cloth| cloth.owns_fragment(fragment))
            .is_some_and(|cloth| cloth.on_fragment_expired(host, fragment))
    }

    /// Material slots of the surface, or `None` when it has none.
    pub fn get_material_ids(host: &dyn Host, surface: SurfaceId) -> Option<Vec<MaterialId>> {
        if !host.is_surface_valid(surface) {
            BreakError::InvalidSurface(surface).report("get_material_ids");
            return None;
        }
        let ids: Vec<MaterialId> = (0..host.material_count(surface)).map(MaterialId).collect();
        (!ids.is_empty()).then_some(ids)
    }

    pub fn has_cloth(host: &dyn Host, surface: SurfaceId) -> bool {
        host.is_surface_valid(surface) && host.has_cloth(surface)
    }

    fn existing(&mut self, surface: SurfaceId) -> BreakResult<&mut BreakableCloth> {
        self.controllers
            .get_mut(&surface)
            .ok_or(BreakError::Uninitialized)
    }

    fn ensure(&mut self, host: &mut dyn Host, surface: SurfaceId) -> BreakResult<&mut BreakableCloth> {
        if !host.is_surface_valid(surface) {
            return Err(BreakError::InvalidSurface(surface));
        }
        let cloth = self.controllers.entry(surface).or_insert_with(|| {
            tracing::info!("adding breakable cloth to {surface:?}");
            BreakableCloth::with_config(self.default_policy.clone(), self.default_config.clone())
        });
        cloth.attach(host, surface)?;
        Ok(cloth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{GeneratorConfig, StrategyKind};
    use crate::impact::ImpactSource;
    use crate::testing::MockHost;

    const SURFACE: SurfaceId = SurfaceId(11);

    fn system() -> ClothBreakSystem {
        let config = ControllerConfig::default().generator(
            GeneratorConfig::default()
                .strategy(StrategyKind::Primitive)
                .seed(77),
        );
        ClothBreakSystem::with_defaults(BreakPolicy::default(), config)
    }

    #[test]
    fn test_configuration_creates_controller() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut sys = system();

        assert!(sys.set_bullet_parameters(&mut host, SURFACE, 0.0));
        let cloth = sys.controller(SURFACE).unwrap();
        assert!(cloth.is_initialized());
        assert_eq!(cloth.policy().radius_multiplier(), 0.1);

        assert!(sys.set_break_parameters(&mut host, SURFACE, 200.0, 0, 40, 2.0, 1.0));
        let policy = sys.controller(SURFACE).unwrap().policy();
        assert_eq!(policy.fragment_count_range(), 1..=20);
        assert_eq!(policy.fragment_size_range(), 2.0..=2.0);
        assert_eq!(host.subscriptions.len(), 1);
    }

    #[test]
    fn test_triggers_require_controller() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut sys = system();

        assert!(!sys.force_break_at_location(&mut host, SURFACE, Vec3::ZERO, 10.0));
        assert!(!sys.simulate_impact(&mut host, SURFACE, Vec3::ZERO, 5.0, 5000.0));
        assert!(!sys.enable_debug_visualization(SURFACE, true, 1.0));
        assert!(sys.controller(SURFACE).is_none());
        assert_eq!(host.live_bodies(), 0);

        assert!(sys.attach_to_surface(&mut host, SURFACE));
        assert!(sys.force_break_at_location(&mut host, SURFACE, Vec3::ZERO, 10.0));
        assert!(host.live_bodies() > 0);
    }

    #[test]
    fn test_invalid_surface_fails() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut sys = system();
        let ghost = SurfaceId(404);

        assert!(!sys.attach_to_surface(&mut host, ghost));
        assert!(!sys.set_material_breakable(&mut host, ghost, MaterialId(0), true));
        assert!(sys.controller(ghost).is_none());
        assert!(ClothBreakSystem::get_material_ids(&host, ghost).is_none());
        assert!(!ClothBreakSystem::has_cloth(&host, ghost));
    }

    #[test]
    fn test_all_materials_breakable() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut sys = system();

        assert!(sys.set_material_breakable(&mut host, SURFACE, MaterialId(9), true));
        assert!(sys.set_all_materials_breakable(&mut host, SURFACE));
        let ids: Vec<MaterialId> = sys
            .controller(SURFACE)
            .unwrap()
            .policy()
            .breakable_material_ids()
            .iter()
            .copied()
            .collect();
        assert_eq!(ids, vec![MaterialId(0), MaterialId(1)]);
        assert_eq!(
            ClothBreakSystem::get_material_ids(&host, SURFACE),
            Some(vec![MaterialId(0), MaterialId(1)])
        );
        assert!(ClothBreakSystem::has_cloth(&host, SURFACE));
    }

    #[test]
    fn test_dispatch_and_expiry() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut sys = system();
        assert!(sys.attach_to_surface(&mut host, SURFACE));
        assert!(sys.enable_debug_visualization(SURFACE, true, 1.0));

        let bullet = ImpactSource::projectile("Bullet", 5.0, Vec3::new(0.0, 0.0, -8000.0), 2.0);
        let hit = CollisionEvent::new(SURFACE, Vec3::new(5.0, 5.0, 0.0), bullet);
        assert!(sys.dispatch_collision(&mut host, &hit));
        assert_eq!(host.spheres_drawn, 1);

        let mut stray = hit.clone();
        stray.surface = Some(SurfaceId(12));
        assert!(!sys.dispatch_collision(&mut host, &stray));

        let live = host.live_bodies();
        let (_, first) = host.timers[0];
        assert!(sys.on_fragment_expired(&mut host, first));
        assert!(!sys.on_fragment_expired(&mut host, first));
        assert_eq!(host.live_bodies(), live - 1);

        assert!(sys.detach(&mut host, SURFACE));
        assert_eq!(host.live_bodies(), 0);
        assert!(!sys.detach(&mut host, SURFACE));
    }
}
