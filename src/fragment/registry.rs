//! Bounded FIFO of live fragments.

use std::collections::VecDeque;

use glam::Vec3;

use crate::host::{FragmentId, MaterialId};

/// Default population cap per generator.
pub const MAX_LIVE_FRAGMENTS: usize = 50;

/// A spawned debris body.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub id: FragmentId,
    pub spawn_location: Vec3,
    /// Radius of a primitive, bounding radius of a baked piece.
    pub size: f32,
    pub material: Option<MaterialId>,
    pub physics_enabled: bool,
    /// Seconds between spawn and scheduled disposal.
    pub lifetime: f32,
}

/// Live fragments in spawn order.
///
/// Inserting past the capacity evicts the oldest entries and hands them back
/// so the caller can destroy their bodies.
#[derive(Debug, Clone)]
pub struct FragmentRegistry {
    live: VecDeque<Fragment>,
    capacity: usize,
}

impl Default for FragmentRegistry {
    fn default() -> Self {
        Self::new(MAX_LIVE_FRAGMENTS)
    }
}

impl FragmentRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            live: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: FragmentId) -> bool {
        self.live.iter().any(|f| f.id == id)
    }

    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.live.iter().find(|f| f.id == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.live.iter()
    }

    /// Append a fragment and return whatever had to be evicted.
    #[must_use = "evicted fragments still own host bodies"]
    pub fn insert(&mut self, fragment: Fragment) -> Vec<Fragment> {
        self.live.push_back(fragment);
        let excess = self.live.len().saturating_sub(self.capacity);
        self.live.drain(..excess).collect()
    }

    /// Remove a fragment. Unknown ids are ignored.
    pub fn remove(&mut self, id: FragmentId) -> Option<Fragment> {
        let index = self.live.iter().position(|f| f.id == id)?;
        self.live.remove(index)
    }

    /// Keep fragments for which `keep` returns true; returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&Fragment) -> bool) -> usize {
        let before = self.live.len();
        self.live.retain(|f| keep(f));
        before - self.live.len()
    }

    /// Remove every fragment, oldest first.
    pub fn drain(&mut self) -> Vec<Fragment> {
        self.live.drain(..).collect()
    }
}
