//! Error types for the break pipeline.

use glam::Vec3;
use thiserror::Error;

use crate::host::{MaterialId, SurfaceId};

/// How loudly a failed operation should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller misuse: missing references, uninitialized controller.
    Warning,
    /// Expected rejection: weak hits, non-breakable regions, empty cuts.
    Info,
}

/// Reasons a break operation can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BreakError {
    #[error("no target surface attached")]
    NoSurface,

    #[error("surface {0:?} is invalid or destroyed")]
    InvalidSurface(SurfaceId),

    #[error("collision event has no source body")]
    MissingSource,

    #[error("controller is not initialized")]
    Uninitialized,

    #[error("controller has been torn down")]
    TornDown,

    #[error("impact force {force:.1} below threshold {threshold:.1}")]
    BelowThreshold { force: f32, threshold: f32 },

    #[error("location {location} is not in a breakable region (material {material:?})")]
    NotBreakable {
        location: Vec3,
        material: Option<MaterialId>,
    },

    #[error("source is not a projectile")]
    NotProjectile,

    #[error("no fragments were produced")]
    NoFragments,
}

impl BreakError {
    /// Classify the error for diagnostics.
    pub fn severity(&self) -> Severity {
        match self {
            BreakError::NoSurface
            | BreakError::InvalidSurface(_)
            | BreakError::MissingSource
            | BreakError::Uninitialized
            | BreakError::TornDown => Severity::Warning,
            BreakError::BelowThreshold { .. }
            | BreakError::NotBreakable { .. }
            | BreakError::NotProjectile
            | BreakError::NoFragments => Severity::Info,
        }
    }

    /// Emit the error at the level matching its severity.
    pub fn report(&self, operation: &str) {
        match self.severity() {
            Severity::Warning => tracing::warn!("{operation}: {self}"),
            Severity::Info => tracing::info!("{operation}: {self}"),
        }
    }
}

pub type BreakResult<T> = Result<T, BreakError>;
