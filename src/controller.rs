//! Breakable surface controller.
//!
//! A [`BreakableCloth`] ties one surface to its policy, evaluator, and
//! fragment generator. Hits flow through the same pipeline regardless of how
//! they arrive:
//!
//! 1. source filter (collision notifications only)
//! 2. impact evaluation
//! 3. force threshold (skipped for manual breaks)
//! 4. material check
//! 5. fragment generation
//! 6. [`BreakEvent`] to every listener

use glam::Vec3;

use crate::error::{BreakError, BreakResult};
use crate::fragment::{FragmentGenerator, GenerateRequest, GeneratorConfig};
use crate::host::{FragmentId, Host, MaterialId, SubscriptionId, SurfaceId};
use crate::impact::{clamp_radius, CollisionEvent, ImpactEvaluator, ImpactResult, ImpactSource};
use crate::policy::BreakPolicy;

/// Multiplier applied to the threshold when a manual break gives no force.
pub const MANUAL_FORCE_FACTOR: f32 = 1.5;

/// Lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Initialized,
    /// Terminal.
    TornDown,
}

/// How collision sources are recognized as projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    /// Marker, tag, or a name/class name containing the marker string.
    #[default]
    Loose,
    /// Marker or tag only.
    Strict,
}

impl SourceFilter {
    pub fn accepts(&self, source: &ImpactSource, marker: &str) -> bool {
        if source.projectile || source.has_tag(marker) {
            return true;
        }
        match self {
            SourceFilter::Loose => {
                source.name.contains(marker) || source.class_name.contains(marker)
            }
            SourceFilter::Strict => false,
        }
    }
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Default: [`SourceFilter::Loose`].
    pub source_filter: SourceFilter,
    /// Tag and name fragment identifying projectiles. Default: "Bullet".
    pub projectile_marker: String,
    pub generator: GeneratorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            source_filter: SourceFilter::default(),
            projectile_marker: "Bullet".to_string(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn source_filter(mut self, filter: SourceFilter) -> Self {
        self.source_filter = filter;
        self
    }

    pub fn projectile_marker(mut self, marker: impl Into<String>) -> Self {
        self.projectile_marker = marker.into();
        self
    }

    pub fn generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }
}

/// Emitted after a successful break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakEvent {
    pub surface: SurfaceId,
    pub location: Vec3,
    pub radius: f32,
    pub force: f32,
    pub material: MaterialId,
    /// Fragments spawned by the break.
    pub fragments: usize,
}

type Listener = Box<dyn FnMut(&BreakEvent)>;

/// Makes one cloth surface breakable.
pub struct BreakableCloth {
    config: ControllerConfig,
    state: ControllerState,
    surface: Option<SurfaceId>,
    policy: BreakPolicy,
    evaluator: Option<ImpactEvaluator>,
    generator: Option<FragmentGenerator>,
    subscription: Option<SubscriptionId>,
    listeners: Vec<Listener>,
}

impl Default for BreakableCloth {
    fn default() -> Self {
        Self::new(BreakPolicy::default())
    }
}

impl BreakableCloth {
    pub fn new(policy: BreakPolicy) -> Self {
        Self::with_config(policy, ControllerConfig::default())
    }

    pub fn with_config(policy: BreakPolicy, config: ControllerConfig) -> Self {
        Self {
            config,
            state: ControllerState::Uninitialized,
            surface: None,
            policy,
            evaluator: None,
            generator: None,
            subscription: None,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == ControllerState::Initialized
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn policy(&self) -> &BreakPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut BreakPolicy {
        &mut self.policy
    }

    /// The evaluator, once initialized.
    pub fn evaluator(&self) -> Option<&ImpactEvaluator> {
        self.evaluator.as_ref()
    }

    /// Mutable evaluator access, e.g. to toggle debug visualization.
    pub fn evaluator_mut(&mut self) -> Option<&mut ImpactEvaluator> {
        self.evaluator.as_mut()
    }

    pub fn generator(&self) -> Option<&FragmentGenerator> {
        self.generator.as_ref()
    }

    /// Register a break listener.
    pub fn on_break(&mut self, listener: impl FnMut(&BreakEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Point the controller at `surface` and initialize it.
    ///
    /// Re-attaching the same surface is a no-op. Attaching a different one
    /// moves the hit subscription over.
    pub fn attach(&mut self, host: &mut dyn Host, surface: SurfaceId) -> BreakResult<()> {
        if self.state == ControllerState::TornDown {
            return Err(BreakError::TornDown);
        }
        if !host.is_surface_valid(surface) {
            return Err(BreakError::InvalidSurface(surface));
        }
        if self.surface != Some(surface) {
            if let Some(subscription) = self.subscription.take() {
                host.unsubscribe_hits(subscription);
            }
            self.surface = Some(surface);
        }
        self.activate(host)
    }

    /// Initialize against the attached surface. Safe to call repeatedly.
    pub fn activate(&mut self, host: &mut dyn Host) -> BreakResult<()> {
        if self.state == ControllerState::TornDown {
            return Err(BreakError::TornDown);
        }
        let surface = self.surface.ok_or(BreakError::NoSurface)?;
        if !host.is_surface_valid(surface) {
            return Err(BreakError::InvalidSurface(surface));
        }

        if self.evaluator.is_none() {
            self.evaluator = Some(ImpactEvaluator::new());
        }
        if self.generator.is_none() {
            self.generator = Some(FragmentGenerator::new(self.config.generator.clone()));
        }
        if self.subscription.is_none() {
            self.subscription = host.subscribe_hits(surface);
            match self.subscription {
                Some(_) => tracing::debug!("subscribed to hits on {surface:?}"),
                None => tracing::debug!("{surface:?} does not deliver hit notifications"),
            }
        }

        if self.state == ControllerState::Uninitialized {
            self.state = ControllerState::Initialized;
            tracing::info!("breakable cloth initialized on {surface:?}");
        }
        Ok(())
    }

    /// Collision notification: filter the source, then run the pipeline.
    pub fn handle_collision(
        &mut self,
        host: &mut dyn Host,
        event: &CollisionEvent,
    ) -> BreakResult<BreakEvent> {
        self.ensure_ready(host)?;
        let source = event.source.as_ref().ok_or(BreakError::MissingSource)?;
        if !self
            .config
            .source_filter
            .accepts(source, &self.config.projectile_marker)
        {
            return Err(BreakError::NotProjectile);
        }
        self.handle_hit(host, event)
    }

    /// Run the pipeline for a hit without filtering its source.
    pub fn handle_hit(
        &mut self,
        host: &mut dyn Host,
        event: &CollisionEvent,
    ) -> BreakResult<BreakEvent> {
        self.ensure_ready(host)?;
        let evaluator = self.evaluator.as_ref().ok_or(BreakError::Uninitialized)?;
        let impact = evaluator.evaluate(event, self.policy.radius_multiplier(), &mut *host)?;
        self.break_at(host, impact, true)
    }

    /// Break at `location` regardless of force. The material check still
    /// applies. `force` defaults to 1.5 times the threshold.
    pub fn force_break_at_location(
        &mut self,
        host: &mut dyn Host,
        location: Vec3,
        radius: f32,
        force: Option<f32>,
    ) -> BreakResult<BreakEvent> {
        self.ensure_ready(host)?;
        let impact = ImpactResult {
            location,
            break_radius: clamp_radius(radius),
            impact_force: force
                .unwrap_or(self.policy.break_force_threshold() * MANUAL_FORCE_FACTOR),
        };
        self.break_at(host, impact, false)
    }

    /// Scripted impact with explicit size and force. Threshold and material
    /// checks apply.
    pub fn simulate_impact(
        &mut self,
        host: &mut dyn Host,
        location: Vec3,
        source_size: f32,
        impact_force: f32,
    ) -> BreakResult<BreakEvent> {
        self.ensure_ready(host)?;
        let evaluator = self.evaluator.as_ref().ok_or(BreakError::Uninitialized)?;
        let impact = evaluator.simulate(
            location,
            source_size,
            impact_force,
            self.policy.radius_multiplier(),
            &mut *host,
        );
        self.break_at(host, impact, true)
    }

    /// Timer callback for fragment disposal.
    pub fn on_fragment_expired(&mut self, host: &mut dyn Host, fragment: FragmentId) -> bool {
        self.generator
            .as_mut()
            .is_some_and(|g| g.on_fragment_expired(host, fragment))
    }

    /// Whether this controller still tracks `fragment`.
    pub fn owns_fragment(&self, fragment: FragmentId) -> bool {
        self.generator
            .as_ref()
            .is_some_and(|g| g.registry().contains(fragment))
    }

    /// Unsubscribe and destroy every live fragment. Terminal.
    pub fn teardown(&mut self, host: &mut dyn Host) {
        if self.state == ControllerState::TornDown {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe_hits(subscription);
        }
        if let Some(generator) = self.generator.as_mut() {
            generator.clear(host);
        }
        self.state = ControllerState::TornDown;
        tracing::info!("breakable cloth on {:?} torn down", self.surface);
    }

    fn ensure_ready(&self, host: &dyn Host) -> BreakResult<SurfaceId> {
        match self.state {
            ControllerState::Initialized => {}
            ControllerState::Uninitialized => return Err(BreakError::Uninitialized),
            ControllerState::TornDown => return Err(BreakError::TornDown),
        }
        let surface = self.surface.ok_or(BreakError::NoSurface)?;
        if !host.is_surface_valid(surface) {
            return Err(BreakError::InvalidSurface(surface));
        }
        Ok(surface)
    }

    fn break_at(
        &mut self,
        host: &mut dyn Host,
        impact: ImpactResult,
        check_threshold: bool,
    ) -> BreakResult<BreakEvent> {
        let surface = self.ensure_ready(host)?;

        if check_threshold && !self.policy.is_eligible(impact.impact_force) {
            return Err(BreakError::BelowThreshold {
                force: impact.impact_force,
                threshold: self.policy.break_force_threshold(),
            });
        }

        let nearest = host.nearest_material(surface, impact.location);
        let (breakable, material) = self.policy.is_location_breakable(nearest);
        if !breakable {
            return Err(BreakError::NotBreakable {
                location: impact.location,
                material: nearest,
            });
        }

        let request = GenerateRequest::from_policy(surface, &impact, &self.policy);
        let generator = self.generator.as_mut().ok_or(BreakError::Uninitialized)?;
        let fragments = generator.generate(host, &request)?;

        let event = BreakEvent {
            surface,
            location: impact.location,
            radius: impact.break_radius,
            force: impact.impact_force,
            material,
            fragments,
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
        tracing::info!(
            "cloth broken at {} (radius {:.2}, force {:.1}, material {})",
            event.location,
            event.radius,
            event.force,
            event.material.0
        );
        Ok(event)
    }
}
