//! X-bucketed spatial index
//!
//! The world is a long horizontal strip, so collectibles are bucketed by x
//! only. Proximity queries touch the few buckets overlapping the query span
//! instead of every entity ever spawned. Results are a conservative superset:
//! callers still do the exact distance check.

use std::collections::HashMap;

use crate::consts::BUCKET_WIDTH;

#[derive(Debug, Clone, Default)]
pub struct XIndex {
    buckets: HashMap<i32, Vec<usize>>,
}

impl XIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bucket_of(x: f32) -> i32 {
        (x / BUCKET_WIDTH).floor() as i32
    }

    /// Register arena slot `slot` at world x
    pub fn insert(&mut self, slot: usize, x: f32) {
        self.buckets.entry(Self::bucket_of(x)).or_default().push(slot);
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Slots whose bucket overlaps `[x_min, x_max]`, in ascending order
    pub fn span(&self, x_min: f32, x_max: f32) -> Vec<usize> {
        let mut slots: Vec<usize> = (Self::bucket_of(x_min)..=Self::bucket_of(x_max))
            .filter_map(|b| self.buckets.get(&b))
            .flatten()
            .copied()
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Slots that may lie within `radius` of `x`
    pub fn near(&self, x: f32, radius: f32) -> Vec<usize> {
        self.span(x - radius, x + radius)
    }
}
