//! # Scatter Brush
//!
//! Painting drops a handful of cells at random offsets around the pointer,
//! each with a random aux byte, so poured material looks grainy.

use granule_core::{Grid, MaterialId};
use rand::{Rng, RngCore};

use crate::config::BrushConfig;

/// Largest aux byte a brush drop can carry.
pub const MAX_DROP_AUX: u8 = 254;

/// A material plus the scatter pattern used to paint it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    /// Material written by every drop.
    pub material: MaterialId,
    /// Drops land within `radius` cells of the center on each axis.
    pub radius: i32,
    /// Drops per stamp.
    pub drops: u32,
}

impl Brush {
    /// Builds a brush for `material` from config.
    #[must_use]
    pub const fn new(material: MaterialId, config: BrushConfig) -> Self {
        Self {
            material,
            radius: config.radius,
            drops: config.drops,
        }
    }

    /// Writes one round of drops around `(x, y)` into the grid's next generation.
    ///
    /// Drops that land outside the grid are discarded. Returns how many landed.
    pub fn stamp(&self, grid: &mut Grid, rng: &mut dyn RngCore, x: i32, y: i32) -> usize {
        let radius = self.radius.max(0);
        let mut landed = 0;
        for _ in 0..self.drops {
            let dx = rng.gen_range(-radius..=radius);
            let dy = rng.gen_range(-radius..=radius);
            let aux = rng.gen_range(0..=MAX_DROP_AUX);
            if grid.write_id(x.saturating_add(dx), y.saturating_add(dy), self.material, aux) {
                landed += 1;
            }
        }
        landed
    }
}
