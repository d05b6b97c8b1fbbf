//! # Rules Engine
//!
//! One update pass visits every cell in row-major order:
//!
//! ```text
//! for each (x, y):
//!   written this tick?  -> skip (it already moved, or was moved into)
//!   unknown id?         -> skip (decays to air on the next flip)
//!   Inert               -> nothing
//!   Moves               -> first successful swap_offset_if_type wins,
//!                          otherwise write the cell back in place
//!   Custom              -> call the update function
//! ```
//!
//! The write-back is required: the next generation starts zeroed, so an
//! untouched cell would become air.

use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::grid::{Cell, Grid, Probe, ReadMode};
use crate::material::{Plan, TypeRegistry};

/// What happened to a single visited cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Already written this tick; not updated again.
    Skipped,
    /// Unregistered material id; treated as air.
    Unknown,
    /// Material has no update behavior.
    Inert,
    /// A candidate move succeeded.
    Moved,
    /// No move succeeded; the cell was written back in place.
    Settled,
    /// A custom update function ran.
    Custom,
}

/// Counters for one update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Cells visited (always the full grid).
    pub visited: usize,
    /// Cells skipped because an earlier swap already wrote them.
    pub skipped: usize,
    /// Cells whose id is not registered.
    pub unknown: usize,
    /// Cells with no update behavior.
    pub inert: usize,
    /// Cells that moved.
    pub moved: usize,
    /// Cells that stayed and rewrote themselves.
    pub settled: usize,
    /// Cells handled by a custom update function.
    pub custom: usize,
}

impl PassStats {
    fn record(&mut self, outcome: Outcome) {
        self.visited += 1;
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Unknown => self.unknown += 1,
            Outcome::Inert => self.inert += 1,
            Outcome::Moved => self.moved += 1,
            Outcome::Settled => self.settled += 1,
            Outcome::Custom => self.custom += 1,
        }
    }
}

/// Draws a uniform +1 / -1.
#[inline]
fn draw_bias(rng: &mut dyn RngCore) -> i32 {
    if rng.gen_bool(0.5) {
        1
    } else {
        -1
    }
}

/// Dispatches each cell to its material's compiled update plan.
#[derive(Clone, Debug)]
pub struct RulesEngine {
    registry: Arc<TypeRegistry>,
}

impl RulesEngine {
    /// Creates an engine over `registry`.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Creates an engine sharing `grid`'s registry.
    #[must_use]
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(Arc::clone(grid.registry()))
    }

    /// The registry this engine dispatches through.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Runs one update pass over every cell of `grid`.
    ///
    /// Writes land in the next generation; the caller still has to clear the
    /// dirty mask and advance the generation to finish the tick.
    pub fn update_all(&self, grid: &mut Grid, rng: &mut dyn RngCore) -> PassStats {
        debug_assert!(
            Arc::ptr_eq(&self.registry, grid.registry()),
            "rules engine and grid must share a registry"
        );

        let mut stats = PassStats::default();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                stats.record(self.visit(grid, rng, x, y));
            }
        }

        tracing::trace!(
            generation = grid.generation(),
            moved = stats.moved,
            settled = stats.settled,
            skipped = stats.skipped,
            "update pass complete"
        );
        stats
    }

    /// Visits a single cell: skips it if already written, otherwise updates it.
    pub fn visit(&self, grid: &mut Grid, rng: &mut dyn RngCore, x: i32, y: i32) -> Outcome {
        if grid.is_dirty(x, y) {
            return Outcome::Skipped;
        }
        match grid.read(x, y, ReadMode::Current) {
            Probe::Cell(cell) => self.update_cell(grid, rng, x, y, cell),
            Probe::Unknown(_) | Probe::OutOfBounds => Outcome::Unknown,
        }
    }

    /// Runs `cell`'s material behavior at `(x, y)` unconditionally.
    pub fn update_cell(
        &self,
        grid: &mut Grid,
        rng: &mut dyn RngCore,
        x: i32,
        y: i32,
        cell: Cell,
    ) -> Outcome {
        let Some(plan) = self.registry.plan_of(cell.material) else {
            return Outcome::Unknown;
        };

        match plan {
            Plan::Inert => Outcome::Inert,
            Plan::Custom(update) => {
                update(grid, rng, x, y, cell.aux);
                Outcome::Custom
            }
            Plan::Moves { moves, biased } => {
                let (bias_x, bias_y) = if *biased {
                    (draw_bias(rng), draw_bias(rng))
                } else {
                    (1, 1)
                };
                for mv in moves.iter() {
                    let (dx, dy) = (mv.dx.resolve(bias_x, bias_y), mv.dy.resolve(bias_x, bias_y));
                    if grid.swap_offset_if_type(x, y, dx, dy, &mv.into) {
                        return Outcome::Moved;
                    }
                }
                grid.write_id(x, y, cell.material, cell.aux);
                Outcome::Settled
            }
        }
    }
}
