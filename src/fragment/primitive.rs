//! Debris made of sphere primitives scattered around the impact.

use rand::rngs::SmallRng;

use super::{sampling, select_material, FragmentStrategy, GenerateRequest, SpawnedPiece};
use crate::host::Host;

#[derive(Debug, Clone, Copy)]
pub struct PrimitiveStrategy {
    /// Fraction of the break radius fragments are placed within.
    pub spawn_radius_factor: f32,
}

impl Default for PrimitiveStrategy {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl PrimitiveStrategy {
    pub fn new(spawn_radius_factor: f32) -> Self {
        Self {
            spawn_radius_factor: spawn_radius_factor.clamp(0.0, 1.0),
        }
    }
}

impl FragmentStrategy for PrimitiveStrategy {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn spawn(
        &mut self,
        host: &mut dyn Host,
        request: &GenerateRequest,
        count: u32,
        rng: &mut SmallRng,
    ) -> Vec<SpawnedPiece> {
        let material = select_material(host, request.surface, request.material_filter);
        let scatter = request.radius * self.spawn_radius_factor;

        let mut pieces = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let size = sampling::size_in(rng, &request.size_range);
            let location = request.location + sampling::offset_in_ball(rng, scatter);
            if size <= 0.0 {
                continue;
            }
            match host.spawn_primitive(location, size, material) {
                Some(id) => pieces.push(SpawnedPiece {
                    id,
                    location,
                    size,
                    material,
                }),
                None => tracing::debug!("host refused primitive fragment at {location}"),
            }
        }
        pieces
    }
}
