//! Breakability policy: thresholds, fragment parameters, and the material
//! allow-list.
//!
//! Every setter clamps its inputs so the policy is never left inconsistent.
//! The same clamping runs when a policy is deserialized.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::host::MaterialId;

/// Upper bound for the minimum fragment count.
pub const MIN_FRAGMENT_COUNT_LIMIT: u32 = 10;
/// Upper bound for the maximum fragment count.
pub const MAX_FRAGMENT_COUNT_LIMIT: u32 = 20;
/// Floor for multipliers, sizes, masses, and lifetimes.
pub const MIN_POSITIVE: f32 = 0.1;
/// Ceiling for the radius multiplier.
pub const MAX_RADIUS_MULTIPLIER: f32 = 100.0;
/// Ceiling for fragment sizes.
pub const MAX_FRAGMENT_SIZE: f32 = 1000.0;
/// Ceiling for fragment lifetimes, in seconds.
pub const MAX_FRAGMENT_LIFETIME: f32 = 3600.0;
/// Ceiling for fragment masses.
pub const MAX_FRAGMENT_MASS: f32 = 10_000.0;

/// Per-surface breaking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolicyRecord")]
pub struct BreakPolicy {
    /// Unique ids in the order they were added.
    breakable_material_ids: Vec<MaterialId>,
    break_force_threshold: f32,
    radius_multiplier: f32,
    min_fragment_count: u32,
    max_fragment_count: u32,
    min_fragment_size: f32,
    max_fragment_size: f32,
    fragment_lifetime: f32,
    fragment_physics_enabled: bool,
    fragment_mass: f32,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            breakable_material_ids: Vec::new(),
            break_force_threshold: 1000.0,
            radius_multiplier: 2.0,
            min_fragment_count: 3,
            max_fragment_count: 7,
            min_fragment_size: 5.0,
            max_fragment_size: 20.0,
            fragment_lifetime: 5.0,
            fragment_physics_enabled: true,
            fragment_mass: 1.0,
        }
    }
}

impl BreakPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the force threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.break_force_threshold = non_negative(threshold);
        self
    }

    /// Set the source-size to break-radius multiplier.
    pub fn with_radius_multiplier(mut self, multiplier: f32) -> Self {
        self.set_radius_multiplier(multiplier);
        self
    }

    /// Set the fragment count range.
    pub fn with_fragment_counts(mut self, min: u32, max: u32) -> Self {
        self.set_counts(min, max);
        self
    }

    /// Set the fragment size range.
    pub fn with_fragment_sizes(mut self, min: f32, max: f32) -> Self {
        self.set_sizes(min, max);
        self
    }

    /// Restrict breaking to the given materials.
    pub fn with_breakable_materials(mut self, ids: impl IntoIterator<Item = MaterialId>) -> Self {
        self.set_all_materials_breakable(ids);
        self
    }

    pub fn break_force_threshold(&self) -> f32 {
        self.break_force_threshold
    }

    pub fn radius_multiplier(&self) -> f32 {
        self.radius_multiplier
    }

    pub fn fragment_count_range(&self) -> RangeInclusive<u32> {
        self.min_fragment_count..=self.max_fragment_count
    }

    pub fn fragment_size_range(&self) -> RangeInclusive<f32> {
        self.min_fragment_size..=self.max_fragment_size
    }

    pub fn fragment_lifetime(&self) -> f32 {
        self.fragment_lifetime
    }

    pub fn fragment_physics_enabled(&self) -> bool {
        self.fragment_physics_enabled
    }

    pub fn fragment_mass(&self) -> f32 {
        self.fragment_mass
    }

    /// Breakable materials in the order they were added. Empty means every
    /// material breaks.
    pub fn breakable_material_ids(&self) -> &[MaterialId] {
        &self.breakable_material_ids
    }

    /// Whether `impact_force` is strong enough to break the surface.
    pub fn is_eligible(&self, impact_force: f32) -> bool {
        impact_force >= self.break_force_threshold
    }

    /// Decide whether the surface breaks at a point whose nearest material
    /// is `nearest`, and report the material to attribute the break to.
    ///
    /// An empty allow-list accepts everything. When the surface could not
    /// resolve a material, the first allowed material is assumed.
    pub fn is_location_breakable(&self, nearest: Option<MaterialId>) -> (bool, MaterialId) {
        if self.breakable_material_ids.is_empty() {
            return (true, nearest.unwrap_or_default());
        }
        match nearest {
            Some(id) => (self.breakable_material_ids.contains(&id), id),
            None => {
                let first = self
                    .breakable_material_ids
                    .first()
                    .copied()
                    .unwrap_or_default();
                (true, first)
            }
        }
    }

    /// Add or remove a material from the allow-list. Returns whether the
    /// list changed.
    pub fn set_material_breakable(&mut self, material: MaterialId, breakable: bool) -> bool {
        let position = self
            .breakable_material_ids
            .iter()
            .position(|&id| id == material);
        match (breakable, position) {
            (true, None) => {
                self.breakable_material_ids.push(material);
                true
            }
            (false, Some(index)) => {
                self.breakable_material_ids.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Replace the allow-list. Duplicates are dropped.
    pub fn set_all_materials_breakable(&mut self, ids: impl IntoIterator<Item = MaterialId>) {
        self.breakable_material_ids.clear();
        for id in ids {
            self.set_material_breakable(id, true);
        }
    }

    /// Update threshold, count range, and size range at once.
    pub fn set_break_parameters(
        &mut self,
        threshold: f32,
        min_count: u32,
        max_count: u32,
        min_size: f32,
        max_size: f32,
    ) {
        self.break_force_threshold = non_negative(threshold);
        self.set_counts(min_count, max_count);
        self.set_sizes(min_size, max_size);
    }

    pub fn set_radius_multiplier(&mut self, multiplier: f32) {
        self.radius_multiplier = positive(multiplier, MAX_RADIUS_MULTIPLIER);
    }

    pub fn set_fragment_physics(&mut self, enabled: bool, mass: f32, lifetime: f32) {
        self.fragment_physics_enabled = enabled;
        self.fragment_mass = positive(mass, MAX_FRAGMENT_MASS);
        self.fragment_lifetime = positive(lifetime, MAX_FRAGMENT_LIFETIME);
    }

    fn set_counts(&mut self, min: u32, max: u32) {
        self.min_fragment_count = min.clamp(1, MIN_FRAGMENT_COUNT_LIMIT);
        self.max_fragment_count = max.clamp(self.min_fragment_count, MAX_FRAGMENT_COUNT_LIMIT);
    }

    fn set_sizes(&mut self, min: f32, max: f32) {
        self.min_fragment_size = positive(min, MAX_FRAGMENT_SIZE);
        self.max_fragment_size = positive(max, MAX_FRAGMENT_SIZE).max(self.min_fragment_size);
    }
}

/// `NaN` and negatives become zero, infinity the largest finite value.
fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, f32::MAX)
    }
}

/// Clamp into `[MIN_POSITIVE, max]`; `NaN` becomes the floor.
fn positive(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        MIN_POSITIVE
    } else {
        value.clamp(MIN_POSITIVE, max)
    }
}

/// Serialized form; every field is optional and the whole record is
/// re-clamped on load.
#[derive(Deserialize)]
#[serde(default)]
struct PolicyRecord {
    breakable_material_ids: Vec<MaterialId>,
    break_force_threshold: f32,
    radius_multiplier: f32,
    min_fragment_count: u32,
    max_fragment_count: u32,
    min_fragment_size: f32,
    max_fragment_size: f32,
    fragment_lifetime: f32,
    fragment_physics_enabled: bool,
    fragment_mass: f32,
}

impl Default for PolicyRecord {
    fn default() -> Self {
        let p = BreakPolicy::default();
        Self {
            breakable_material_ids: p.breakable_material_ids,
            break_force_threshold: p.break_force_threshold,
            radius_multiplier: p.radius_multiplier,
            min_fragment_count: p.min_fragment_count,
            max_fragment_count: p.max_fragment_count,
            min_fragment_size: p.min_fragment_size,
            max_fragment_size: p.max_fragment_size,
            fragment_lifetime: p.fragment_lifetime,
            fragment_physics_enabled: p.fragment_physics_enabled,
            fragment_mass: p.fragment_mass,
        }
    }
}

impl From<PolicyRecord> for BreakPolicy {
    fn from(r: PolicyRecord) -> Self {
        let mut policy = BreakPolicy::default();
        policy.set_all_materials_breakable(r.breakable_material_ids);
        policy.set_break_parameters(
            r.break_force_threshold,
            r.min_fragment_count,
            r.max_fragment_count,
            r.min_fragment_size,
            r.max_fragment_size,
        );
        policy.set_radius_multiplier(r.radius_multiplier);
        policy.set_fragment_physics(
            r.fragment_physics_enabled,
            r.fragment_mass,
            r.fragment_lifetime,
        );
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = BreakPolicy::default();
        assert_eq!(p.break_force_threshold(), 1000.0);
        assert_eq!(p.radius_multiplier(), 2.0);
        assert_eq!(p.fragment_count_range(), 3..=7);
        assert_eq!(p.fragment_size_range(), 5.0..=20.0);
        assert_eq!(p.fragment_lifetime(), 5.0);
        assert!(p.fragment_physics_enabled());
        assert_eq!(p.fragment_mass(), 1.0);
        assert!(p.breakable_material_ids().is_empty());
    }

    #[test]
    fn test_threshold_eligibility() {
        let p = BreakPolicy::default();
        assert!(!p.is_eligible(400.0));
        assert!(p.is_eligible(1000.0));
        assert!(p.is_eligible(1600.0));
    }

    #[test]
    fn test_empty_allow_list_breaks_everywhere() {
        let p = BreakPolicy::default();
        assert_eq!(p.is_location_breakable(None), (true, MaterialId(0)));
        for id in [0, 1, 7, 300] {
            assert_eq!(
                p.is_location_breakable(Some(MaterialId(id))),
                (true, MaterialId(id))
            );
        }
    }

    #[test]
    fn test_allow_list_membership() {
        let p = BreakPolicy::default().with_breakable_materials([MaterialId(2), MaterialId(4)]);
        assert_eq!(
            p.is_location_breakable(Some(MaterialId(4))),
            (true, MaterialId(4))
        );
        assert_eq!(
            p.is_location_breakable(Some(MaterialId(1))),
            (false, MaterialId(1))
        );
        // Unknown material falls back to the first allowed id.
        assert_eq!(p.is_location_breakable(None), (true, MaterialId(2)));
    }

    #[test]
    fn test_fallback_uses_first_added_material() {
        let mut p = BreakPolicy::default();
        p.set_material_breakable(MaterialId(5), true);
        p.set_material_breakable(MaterialId(2), true);
        assert_eq!(p.is_location_breakable(None), (true, MaterialId(5)));

        p.set_material_breakable(MaterialId(5), false);
        assert_eq!(p.is_location_breakable(None), (true, MaterialId(2)));
    }

    #[test]
    fn test_material_toggle() {
        let mut p = BreakPolicy::default();
        assert!(p.set_material_breakable(MaterialId(3), true));
        assert!(!p.set_material_breakable(MaterialId(3), true));
        assert_eq!(p.breakable_material_ids().len(), 1);
        assert!(p.set_material_breakable(MaterialId(3), false));
        assert!(!p.set_material_breakable(MaterialId(3), false));
        assert!(p.breakable_material_ids().is_empty());
    }

    #[test]
    fn test_break_parameters_clamped() {
        let mut p = BreakPolicy::default();
        p.set_break_parameters(-5.0, 0, 50, 0.0, -1.0);
        assert_eq!(p.break_force_threshold(), 0.0);
        assert_eq!(p.fragment_count_range(), 1..=20);
        assert_eq!(p.fragment_size_range(), MIN_POSITIVE..=MIN_POSITIVE);

        p.set_break_parameters(500.0, 15, 4, 8.0, 3.0);
        assert_eq!(p.fragment_count_range(), 10..=10);
        assert_eq!(p.fragment_size_range(), 8.0..=8.0);
    }

    #[test]
    fn test_physics_parameters_clamped() {
        let mut p = BreakPolicy::default().with_radius_multiplier(0.0);
        assert_eq!(p.radius_multiplier(), MIN_POSITIVE);

        p.set_fragment_physics(false, -2.0, 0.0);
        assert!(!p.fragment_physics_enabled());
        assert_eq!(p.fragment_mass(), MIN_POSITIVE);
        assert_eq!(p.fragment_lifetime(), MIN_POSITIVE);
    }

    #[test]
    fn test_non_finite_inputs_clamped() {
        let mut p = BreakPolicy::default();
        p.set_fragment_physics(true, f32::INFINITY, f32::INFINITY);
        assert_eq!(p.fragment_mass(), MAX_FRAGMENT_MASS);
        assert_eq!(p.fragment_lifetime(), MAX_FRAGMENT_LIFETIME);

        p.set_fragment_physics(true, f32::NAN, f32::NAN);
        assert_eq!(p.fragment_mass(), MIN_POSITIVE);
        assert_eq!(p.fragment_lifetime(), MIN_POSITIVE);

        p.set_break_parameters(f32::INFINITY, 3, 7, f32::NAN, f32::INFINITY);
        assert!(p.break_force_threshold().is_finite());
        assert_eq!(p.fragment_size_range(), MIN_POSITIVE..=MAX_FRAGMENT_SIZE);

        p.set_radius_multiplier(f32::INFINITY);
        assert_eq!(p.radius_multiplier(), MAX_RADIUS_MULTIPLIER);
    }

    #[test]
    fn test_deserialize_reclamps() {
        let json = r#"{
            "break_force_threshold": -10.0,
            "min_fragment_count": 12,
            "max_fragment_count": 3,
            "breakable_material_ids": [5, 1, 5]
        }"#;
        let p: BreakPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p.break_force_threshold(), 0.0);
        assert_eq!(p.fragment_count_range(), 10..=10);
        assert_eq!(p.radius_multiplier(), 2.0);
        assert_eq!(p.breakable_material_ids(), &[MaterialId(5), MaterialId(1)]);

        let saved = serde_json::to_string(&p).unwrap();
        let reloaded: BreakPolicy = serde_json::from_str(&saved).unwrap();
        assert_eq!(reloaded, p);
    }
}
