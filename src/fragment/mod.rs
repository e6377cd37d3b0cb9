//! Fragment generation.
//!
//! A [`FragmentGenerator`] owns a [`FragmentStrategy`] that decides what the
//! debris looks like, and the [`FragmentRegistry`] that tracks it. The
//! generator applies everything the strategies share: count clamping, physics
//! setup, launch impulses, disposal timers, and the population cap.

pub mod mesh_cut;
pub mod primitive;
pub mod registry;
pub mod sampling;

pub use mesh_cut::MeshCutStrategy;
pub use primitive::PrimitiveStrategy;
pub use registry::{Fragment, FragmentRegistry, MAX_LIVE_FRAGMENTS};

use std::ops::RangeInclusive;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::{BreakError, BreakResult};
use crate::host::{FragmentId, Host, MaterialId, SurfaceId};
use crate::impact::ImpactResult;
use crate::policy::{BreakPolicy, MAX_FRAGMENT_COUNT_LIMIT};

/// A body a strategy managed to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedPiece {
    pub id: FragmentId,
    pub location: Vec3,
    pub size: f32,
    pub material: Option<MaterialId>,
}

/// Physics applied to every fragment of a break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentPhysics {
    pub enabled: bool,
    pub mass: f32,
    pub lifetime: f32,
}

impl FragmentPhysics {
    pub fn from_policy(policy: &BreakPolicy) -> Self {
        Self {
            enabled: policy.fragment_physics_enabled(),
            mass: policy.fragment_mass(),
            lifetime: policy.fragment_lifetime(),
        }
    }
}

/// Everything needed to break one spot of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub surface: SurfaceId,
    pub location: Vec3,
    pub radius: f32,
    /// Restrict debris to one material region.
    pub material_filter: Option<MaterialId>,
    pub count_range: RangeInclusive<u32>,
    pub size_range: RangeInclusive<f32>,
    pub physics: FragmentPhysics,
}

impl GenerateRequest {
    /// Request for `impact` using the policy's fragment parameters.
    pub fn from_policy(surface: SurfaceId, impact: &ImpactResult, policy: &BreakPolicy) -> Self {
        Self {
            surface,
            location: impact.location,
            radius: impact.break_radius,
            material_filter: None,
            count_range: policy.fragment_count_range(),
            size_range: policy.fragment_size_range(),
            physics: FragmentPhysics::from_policy(policy),
        }
    }
}

/// How debris is shaped.
pub trait FragmentStrategy {
    fn name(&self) -> &'static str;

    /// Spawn up to `count` bodies for `request`. Pieces that end up empty are
    /// skipped rather than reported.
    fn spawn(
        &mut self,
        host: &mut dyn Host,
        request: &GenerateRequest,
        count: u32,
        rng: &mut SmallRng,
    ) -> Vec<SpawnedPiece>;
}

/// Which built-in strategy a generator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Sphere primitives scattered around the impact.
    Primitive,
    /// Pieces cut out of the posed cloth mesh.
    MeshCut,
}

impl Default for StrategyKind {
    fn default() -> Self {
        if cfg!(feature = "mesh-cut") {
            StrategyKind::MeshCut
        } else {
            StrategyKind::Primitive
        }
    }
}

/// Configuration for a [`FragmentGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Built-in strategy. Default: primitive, or mesh cut with the `mesh-cut` feature.
    pub strategy: StrategyKind,
    /// Maximum live fragments before the oldest are evicted. Default: 50.
    pub max_live_fragments: usize,
    /// Maximum fragments attempted per break. Default: 20.
    pub max_fragments_per_break: u32,
    /// Fraction of the break radius fragments are scattered in. Default: 0.8.
    pub spawn_radius_factor: f32,
    /// Magnitude of the random launch impulse (velocity change). Default: 100.
    pub impulse_strength: f32,
    /// Extra sub-pieces carved from a mesh cut. Default: 10.
    pub max_sub_pieces: u32,
    /// Fixed RNG seed for reproducible debris. Default: none (entropy).
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_live_fragments: MAX_LIVE_FRAGMENTS,
            max_fragments_per_break: MAX_FRAGMENT_COUNT_LIMIT,
            spawn_radius_factor: 0.8,
            impulse_strength: 100.0,
            max_sub_pieces: 10,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn build_strategy(&self) -> Box<dyn FragmentStrategy> {
        match self.strategy {
            StrategyKind::Primitive => Box::new(PrimitiveStrategy::new(self.spawn_radius_factor)),
            StrategyKind::MeshCut => Box::new(MeshCutStrategy::new(
                self.spawn_radius_factor,
                self.max_sub_pieces,
            )),
        }
    }
}

/// Spawns debris and owns it until disposal.
pub struct FragmentGenerator {
    config: GeneratorConfig,
    strategy: Box<dyn FragmentStrategy>,
    registry: FragmentRegistry,
    rng: SmallRng,
}

impl FragmentGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let strategy = config.build_strategy();
        Self::with_strategy(config, strategy)
    }

    /// Use a custom strategy; `config.strategy` is ignored.
    pub fn with_strategy(config: GeneratorConfig, strategy: Box<dyn FragmentStrategy>) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            registry: FragmentRegistry::new(config.max_live_fragments),
            config,
            strategy,
            rng,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn registry(&self) -> &FragmentRegistry {
        &self.registry
    }

    /// Break `request.surface` around `request.location`.
    ///
    /// Returns the number of fragments produced. Fails only if the surface is
    /// invalid or nothing could be produced.
    pub fn generate(
        &mut self,
        host: &mut dyn Host,
        request: &GenerateRequest,
    ) -> BreakResult<usize> {
        if !host.is_surface_valid(request.surface) {
            return Err(BreakError::InvalidSurface(request.surface));
        }

        self.prune_dead(host);

        let requested = sampling::count_in(&mut self.rng, &request.count_range);
        let count = requested.clamp(1, self.config.max_fragments_per_break.max(1));
        if count != requested {
            tracing::debug!("fragment count {requested} clamped to {count}");
        }

        let pieces = self.strategy.spawn(host, request, count, &mut self.rng);
        let produced = pieces.len();

        for piece in pieces {
            if request.physics.enabled {
                if !host.enable_physics(piece.id, request.physics.mass) {
                    tracing::debug!("host could not simulate fragment {:?}", piece.id);
                }
                let impulse = sampling::unit_vector(&mut self.rng) * self.config.impulse_strength;
                host.apply_impulse(piece.id, impulse);
            }
            host.schedule_once(request.physics.lifetime, piece.id);

            let evicted = self.registry.insert(Fragment {
                id: piece.id,
                spawn_location: piece.location,
                size: piece.size,
                material: piece.material,
                physics_enabled: request.physics.enabled,
                lifetime: request.physics.lifetime,
            });
            for old in evicted {
                host.destroy(old.id);
            }
        }

        if produced == 0 {
            return Err(BreakError::NoFragments);
        }

        tracing::info!(
            "generated {produced} {} fragments at {} (radius {:.2}, {} live)",
            self.strategy.name(),
            request.location,
            request.radius,
            self.registry.len()
        );
        Ok(produced)
    }

    /// Timer callback: dispose of a fragment whose lifetime ran out.
    ///
    /// Fragments already evicted or destroyed are ignored.
    pub fn on_fragment_expired(&mut self, host: &mut dyn Host, id: FragmentId) -> bool {
        match self.registry.remove(id) {
            Some(fragment) => {
                host.destroy(fragment.id);
                true
            }
            None => false,
        }
    }

    /// Forget fragments whose bodies the host already destroyed.
    pub fn prune_dead(&mut self, host: &dyn Host) -> usize {
        self.registry.retain(|f| host.is_alive(f.id))
    }

    /// Destroy every live fragment.
    pub fn clear(&mut self, host: &mut dyn Host) {
        for fragment in self.registry.drain() {
            host.destroy(fragment.id);
        }
    }
}

/// Material assigned to debris: the filter when the surface has it, else the
/// first slot.
pub(crate) fn select_material(
    host: &dyn Host,
    surface: SurfaceId,
    filter: Option<MaterialId>,
) -> Option<MaterialId> {
    let count = host.material_count(surface);
    if count == 0 {
        return None;
    }
    match filter {
        Some(m) if m.0 < count => Some(m),
        _ => Some(MaterialId(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FragmentBodies;
    use crate::testing::MockHost;

    const SURFACE: SurfaceId = SurfaceId(1);

    fn request(count: RangeInclusive<u32>) -> GenerateRequest {
        GenerateRequest {
            surface: SURFACE,
            location: Vec3::new(10.0, 5.0, 0.0),
            radius: 20.0,
            material_filter: None,
            count_range: count,
            size_range: 5.0..=20.0,
            physics: FragmentPhysics {
                enabled: true,
                mass: 1.0,
                lifetime: 5.0,
            },
        }
    }

    fn generator(kind: StrategyKind) -> FragmentGenerator {
        FragmentGenerator::new(GeneratorConfig::default().strategy(kind).seed(42))
    }

    #[test]
    fn test_primitive_fragments_within_bounds() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut gen = generator(StrategyKind::Primitive);
        let req = request(3..=7);

        let produced = gen.generate(&mut host, &req).unwrap();
        assert!((3..=7).contains(&produced));
        assert_eq!(gen.registry().len(), produced);

        for fragment in gen.registry().iter() {
            assert!((5.0..=20.0).contains(&fragment.size));
            assert!(fragment.spawn_location.distance(req.location) <= 0.8 * req.radius + 1e-3);
            let body = &host.bodies[&fragment.id];
            assert_eq!(body.mass, Some(1.0));
            assert!((body.impulse.length() - 100.0).abs() < 1e-2);
        }
        assert_eq!(host.timers.len(), produced);
        assert!(host.timers.iter().all(|(delay, _)| *delay == 5.0));
    }

    #[test]
    fn test_count_clamped_to_twenty() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut gen = generator(StrategyKind::Primitive);
        let produced = gen.generate(&mut host, &request(30..=30)).unwrap();
        assert_eq!(produced, 20);
        assert_eq!(host.live_bodies(), 20);
    }

    #[test]
    fn test_population_capped_with_fifo_eviction() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut gen = generator(StrategyKind::Primitive);

        let mut spawned: Vec<FragmentId> = Vec::new();
        for _ in 0..5 {
            let before: Vec<FragmentId> = host.bodies.keys().copied().collect();
            gen.generate(&mut host, &request(20..=20)).unwrap();
            assert!(gen.registry().len() <= MAX_LIVE_FRAGMENTS);
            spawned.extend(
                host.bodies
                    .keys()
                    .copied()
                    .filter(|id| !before.contains(id)),
            );
        }

        // 100 spawned, 50 survive: exactly the newest 50.
        spawned.sort();
        let live: Vec<FragmentId> = gen.registry().iter().map(|f| f.id).collect();
        assert_eq!(live, spawned[50..].to_vec());
        assert_eq!(host.live_bodies(), 50);
        assert!(spawned[..50].iter().all(|id| host.destroyed.contains(id)));
    }

    #[test]
    fn test_late_timer_after_eviction_is_noop() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut gen = FragmentGenerator::new(GeneratorConfig {
            max_live_fragments: 2,
            seed: Some(5),
            ..GeneratorConfig::default()
        });
        gen.generate(&mut host, &request(3..=3)).unwrap();

        let (_, first) = host.timers[0];
        assert!(!gen.registry().contains(first));
        let destroyed_before = host.destroyed.len();
        assert!(!gen.on_fragment_expired(&mut host, first));
        assert_eq!(host.destroyed.len(), destroyed_before);

        let (_, last) = host.timers[2];
        assert!(gen.on_fragment_expired(&mut host, last));
        assert!(!host.is_alive(last));
        assert_eq!(gen.registry().len(), 1);
    }

    #[test]
    fn test_refused_physics_still_tracks_fragment() {
        let mut host = MockHost::with_panel(SURFACE);
        host.refuse_physics = true;
        let mut gen = generator(StrategyKind::Primitive);

        let n = gen.generate(&mut host, &request(3..=3)).unwrap();
        assert_eq!(n, 3);
        assert_eq!(gen.registry().len(), 3);
        assert_eq!(host.timers.len(), 3);
        assert!(host.bodies.values().all(|b| b.mass.is_none()));
    }

    #[test]
    fn test_invalid_surface() {
        let mut host = MockHost::default();
        let mut gen = generator(StrategyKind::Primitive);
        assert_eq!(
            gen.generate(&mut host, &request(3..=7)),
            Err(BreakError::InvalidSurface(SURFACE))
        );
        assert!(host.timers.is_empty());
    }

    #[test]
    fn test_physics_disabled_skips_impulse() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut gen = generator(StrategyKind::Primitive);
        let mut req = request(4..=4);
        req.physics.enabled = false;

        gen.generate(&mut host, &req).unwrap();
        assert!(host
            .bodies
            .values()
            .all(|b| b.mass.is_none() && b.impulse == Vec3::ZERO));
        assert!(gen.registry().iter().all(|f| !f.physics_enabled));
        assert_eq!(host.timers.len(), 4);
    }

    #[test]
    fn test_prune_dead_handles() {
        let mut host = MockHost::with_panel(SURFACE);
        let mut gen = generator(StrategyKind::Primitive);
        gen.generate(&mut host, &request(5..=5)).unwrap();

        let victim = gen.registry().iter().next().map(|f| f.id).unwrap();
        host.bodies.remove(&victim);
        assert_eq!(gen.prune_dead(&host), 1);
        assert_eq!(gen.registry().len(), 4);

        gen.clear(&mut host);
        assert!(gen.registry().is_empty());
        assert_eq!(host.live_bodies(), 0);
    }

    #[test]
    fn test_material_selection() {
        let host = MockHost::with_panel(SURFACE);
        assert_eq!(select_material(&host, SURFACE, None), Some(MaterialId(0)));
        assert_eq!(
            select_material(&host, SURFACE, Some(MaterialId(1))),
            Some(MaterialId(1))
        );
        assert_eq!(
            select_material(&host, SURFACE, Some(MaterialId(9))),
            Some(MaterialId(0))
        );
        assert_eq!(select_material(&host, SurfaceId(99), None), None);
    }
}
