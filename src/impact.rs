//! Impact evaluation: collision event to break radius and impact force.
//!
//! Everything here is pure apart from the optional debug overlay, which is
//! drawn after the result is computed and never changes it.

use glam::Vec3;

use crate::error::{BreakError, BreakResult};
use crate::host::{colors, DebugDraw, SurfaceId};

/// Size assumed for a source whose extent cannot be determined.
pub const DEFAULT_SOURCE_SIZE: f32 = 5.0;
/// Smallest break radius produced.
pub const MIN_BREAK_RADIUS: f32 = 1.0;
/// Largest break radius produced.
pub const MAX_BREAK_RADIUS: f32 = 100.0;

/// Speeds below this are treated as noise.
pub const MIN_SOURCE_SPEED: f32 = 100.0;
/// Speed substituted for noisy or missing velocities.
pub const DEFAULT_SOURCE_SPEED: f32 = 1000.0;
/// Masses below this are treated as missing.
pub const MIN_SOURCE_MASS: f32 = 0.1;
/// Mass substituted for light or non-simulating sources.
pub const DEFAULT_SOURCE_MASS: f32 = 1.0;
/// Momentum to force conversion factor.
pub const FORCE_SCALE: f32 = 0.1;
/// Smallest impact force produced.
pub const MIN_IMPACT_FORCE: f32 = 100.0;
/// Largest impact force produced.
pub const MAX_IMPACT_FORCE: f32 = 10_000.0;

/// Height of the force label above the impact point.
const LABEL_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 10.0);

/// Bounding shape of the object that hit the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceShape {
    Sphere { radius: f32 },
    Capsule { radius: f32, half_height: f32 },
    /// Bounding box of an arbitrary shape.
    Box { half_extents: Vec3 },
}

impl SourceShape {
    /// Characteristic size: declared radius for round shapes, largest half
    /// extent otherwise.
    pub fn size(&self) -> f32 {
        match self {
            SourceShape::Sphere { radius } | SourceShape::Capsule { radius, .. } => *radius,
            SourceShape::Box { half_extents } => half_extents.max_element(),
        }
    }
}

/// Physical state of a body at the moment of contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub linear_velocity: Vec3,
    pub mass: f32,
    pub simulating_physics: bool,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            linear_velocity: Vec3::ZERO,
            mass: DEFAULT_SOURCE_MASS,
            simulating_physics: false,
        }
    }
}

/// The object that struck the surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactSource {
    /// Instance name.
    pub name: String,
    /// Type name of the instance.
    pub class_name: String,
    pub tags: Vec<String>,
    /// Set when the spawner declared this object a projectile.
    pub projectile: bool,
    pub shape: Option<SourceShape>,
    pub body: BodyState,
    /// Velocity reported by projectile movement, preferred over `body`.
    pub projectile_velocity: Option<Vec3>,
}

impl ImpactSource {
    /// A marked projectile with a spherical collider moving at `velocity`.
    pub fn projectile(name: impl Into<String>, radius: f32, velocity: Vec3, mass: f32) -> Self {
        Self {
            name: name.into(),
            class_name: String::new(),
            tags: Vec::new(),
            projectile: true,
            shape: Some(SourceShape::Sphere { radius }),
            body: BodyState {
                linear_velocity: velocity,
                mass,
                simulating_physics: true,
            },
            projectile_velocity: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A contact reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub point: Vec3,
    pub normal: Vec3,
    /// The surface that was hit.
    pub surface: Option<SurfaceId>,
    /// The object that hit it.
    pub source: Option<ImpactSource>,
    pub normal_impulse: Vec3,
}

impl CollisionEvent {
    pub fn new(surface: SurfaceId, point: Vec3, source: ImpactSource) -> Self {
        Self {
            point,
            normal: Vec3::Z,
            surface: Some(surface),
            source: Some(source),
            normal_impulse: Vec3::ZERO,
        }
    }
}

/// Outcome of evaluating an impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactResult {
    pub location: Vec3,
    pub break_radius: f32,
    pub impact_force: f32,
}

/// Break radius for a source shape: `clamp(size * multiplier, 1, 100)`.
///
/// Missing shapes and non-positive sizes fall back to [`DEFAULT_SOURCE_SIZE`].
pub fn derive_break_radius(source: Option<&SourceShape>, radius_multiplier: f32) -> f32 {
    let size = source
        .map(SourceShape::size)
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_SOURCE_SIZE);
    clamp_radius(size * radius_multiplier)
}

/// Clamp a raw radius into the supported range. NaN maps to the minimum.
pub fn clamp_radius(radius: f32) -> f32 {
    if radius.is_nan() {
        return MIN_BREAK_RADIUS;
    }
    radius.clamp(MIN_BREAK_RADIUS, MAX_BREAK_RADIUS)
}

/// Force from speed and mass after noise substitution, clamped to
/// `[100, 10000]`.
pub fn impact_force(speed: f32, mass: f32) -> f32 {
    let speed = if speed.is_finite() && speed >= MIN_SOURCE_SPEED {
        speed
    } else {
        DEFAULT_SOURCE_SPEED
    };
    let mass = if mass.is_finite() && mass >= MIN_SOURCE_MASS {
        mass
    } else {
        DEFAULT_SOURCE_MASS
    };
    (mass * speed * FORCE_SCALE).clamp(MIN_IMPACT_FORCE, MAX_IMPACT_FORCE)
}

/// Impact force of a source.
///
/// Projectile-movement velocity wins over the physics body's velocity.
/// The body mass only counts while the body simulates physics.
pub fn derive_impact_force(source: &ImpactSource) -> f32 {
    let velocity = source
        .projectile_velocity
        .unwrap_or(source.body.linear_velocity);
    let mass = if source.body.simulating_physics {
        source.body.mass
    } else {
        DEFAULT_SOURCE_MASS
    };
    impact_force(velocity.length(), mass)
}

/// Debug overlay settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugSettings {
    /// Whether to draw impact spheres and force labels. Default: false.
    pub enabled: bool,
    /// How long overlays stay on screen, in seconds. Default: 3.
    pub duration: f32,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            duration: 3.0,
        }
    }
}

/// Turns collision events into [`ImpactResult`]s.
#[derive(Debug, Clone, Default)]
pub struct ImpactEvaluator {
    debug: DebugSettings,
}

impl ImpactEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&self) -> DebugSettings {
        self.debug
    }

    pub fn set_debug_visualization(&mut self, enabled: bool, duration: f32) {
        self.debug = DebugSettings {
            enabled,
            duration: duration.max(0.0),
        };
    }

    /// Evaluate a real hit. Fails without output if the event lacks a
    /// surface or a source.
    pub fn evaluate<D: DebugDraw + ?Sized>(
        &self,
        event: &CollisionEvent,
        radius_multiplier: f32,
        draw: &mut D,
    ) -> BreakResult<ImpactResult> {
        if event.surface.is_none() {
            return Err(BreakError::NoSurface);
        }
        let source = event.source.as_ref().ok_or(BreakError::MissingSource)?;

        let result = ImpactResult {
            location: event.point,
            break_radius: derive_break_radius(source.shape.as_ref(), radius_multiplier),
            impact_force: derive_impact_force(source),
        };

        self.draw_overlay(draw, &result, colors::RED, "Force");
        tracing::debug!(
            "impact evaluated: location={}, radius={:.2}, force={:.1}",
            result.location,
            result.break_radius,
            result.impact_force
        );
        Ok(result)
    }

    /// Evaluate a scripted impact of a source of `source_size` hitting with
    /// `impact_force`. The force is used as given.
    pub fn simulate<D: DebugDraw + ?Sized>(
        &self,
        location: Vec3,
        source_size: f32,
        impact_force: f32,
        radius_multiplier: f32,
        draw: &mut D,
    ) -> ImpactResult {
        let result = ImpactResult {
            location,
            break_radius: clamp_radius(source_size * radius_multiplier),
            impact_force,
        };
        self.draw_overlay(draw, &result, colors::GREEN, "Simulated Force");
        result
    }

    fn draw_overlay<D: DebugDraw + ?Sized>(
        &self,
        draw: &mut D,
        result: &ImpactResult,
        color: [f32; 4],
        label: &str,
    ) {
        if !self.debug.enabled {
            return;
        }
        draw.draw_sphere(
            result.location,
            result.break_radius,
            color,
            self.debug.duration,
        );
        draw.draw_text(
            result.location + LABEL_OFFSET,
            &format!("{label}: {:.1}", result.impact_force),
            colors::WHITE,
            self.debug.duration,
        );
    }
}
