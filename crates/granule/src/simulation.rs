//! # Simulation Host
//!
//! Owns the grid, the rules engine and the seeded bias source, and drives
//! ticks in the order the engine requires:
//!
//! ```text
//! Tick N:
//! 1. PAINT    queued and held brush strokes write into the next generation
//! 2. UPDATE   row-major pass; painted cells are already dirty and skipped
//! 3. RENDER   current generation into the frame (optional)
//! 4. CLEAR    reset the written mask
//! 5. ADVANCE  next generation becomes current
//! ```

use std::time::{Duration, Instant};

use granule_core::{materials, Grid, Material, ReadMode, RulesEngine, SimResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::brush::Brush;
use crate::config::SimulationConfig;
use crate::error::ConfigResult;
use crate::frame::Frame;
use crate::stats::{TickReport, TickStatsAccumulator};

/// A brush stamped at a fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Stroke {
    x: i32,
    y: i32,
    brush: Brush,
}

/// A running sandbox.
pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    rules: RulesEngine,
    rng: ChaCha8Rng,
    /// One-shot strokes for the next tick.
    queued: Vec<Stroke>,
    /// Strokes repeated every tick until released.
    held: Vec<Stroke>,
    tick: u64,
    stats: TickStatsAccumulator,
}

impl Simulation {
    /// Creates a simulation with the standard materials.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: SimulationConfig) -> ConfigResult<Self> {
        Self::with_materials(config, materials::standard())
    }

    /// Creates a simulation with a custom material list.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the engine rejects the
    /// grid dimensions or materials.
    pub fn with_materials(config: SimulationConfig, materials: Vec<Material>) -> ConfigResult<Self> {
        config.validate()?;
        let grid = Grid::new(config.grid.width, config.grid.height, materials)?;
        let rules = RulesEngine::for_grid(&grid);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        tracing::info!(
            width = config.grid.width,
            height = config.grid.height,
            materials = grid.registry().len(),
            seed = config.seed,
            "simulation created"
        );

        Ok(Self {
            config,
            grid,
            rules,
            rng,
            queued: Vec::new(),
            held: Vec::new(),
            tick: 0,
            stats: TickStatsAccumulator::new(),
        })
    }

    /// The config this simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for direct edits between ticks.
    ///
    /// Writes land in the next generation and become visible after the
    /// following [`Simulation::step`].
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Ticks completed so far.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Running tick statistics.
    #[must_use]
    pub fn stats(&self) -> &TickStatsAccumulator {
        &self.stats
    }

    fn stroke(&self, x: i32, y: i32, material: &str) -> SimResult<Stroke> {
        let id = self.grid.registry().id_of(material)?;
        Ok(Stroke {
            x,
            y,
            brush: Brush::new(id, self.config.brush),
        })
    }

    /// Queues one brush stamp at `(x, y)` for the next tick.
    ///
    /// # Errors
    ///
    /// [`granule_core::SimError::UnknownMaterial`] if `material` is not registered.
    pub fn paint(&mut self, x: i32, y: i32, material: &str) -> SimResult<()> {
        let stroke = self.stroke(x, y, material)?;
        self.queued.push(stroke);
        Ok(())
    }

    /// Stamps the brush at `(x, y)` on every tick until [`Simulation::release`].
    ///
    /// # Errors
    ///
    /// [`granule_core::SimError::UnknownMaterial`] if `material` is not registered.
    pub fn hold(&mut self, x: i32, y: i32, material: &str) -> SimResult<()> {
        let stroke = self.stroke(x, y, material)?;
        self.held.push(stroke);
        Ok(())
    }

    /// Stops every held stroke.
    pub fn release(&mut self) {
        self.held.clear();
    }

    /// Number of strokes currently held.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Runs one tick, rendering into `frame` if given.
    pub fn step(&mut self, frame: Option<&mut Frame>) -> TickReport {
        let start = Instant::now();

        let mut painted = 0;
        for stroke in self.queued.drain(..).chain(self.held.iter().copied()) {
            painted += stroke
                .brush
                .stamp(&mut self.grid, &mut self.rng, stroke.x, stroke.y);
        }

        let pass = self.rules.update_all(&mut self.grid, &mut self.rng);

        if let Some(frame) = frame {
            frame.draw(&self.grid);
        }

        self.grid.clear_dirty_mask();
        self.grid.advance_generation();

        let report = TickReport {
            tick: self.tick,
            pass,
            painted,
            elapsed: start.elapsed(),
        };
        self.tick += 1;

        let budget = Duration::from_millis(self.config.frame_budget_ms);
        self.stats.record(&report, budget);
        if report.elapsed > budget {
            tracing::warn!(
                tick = report.tick,
                elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.config.frame_budget_ms,
                "tick exceeded budget"
            );
        } else {
            tracing::debug!(
                tick = report.tick,
                moved = pass.moved,
                painted,
                elapsed_us = report.elapsed_us(),
                "tick"
            );
        }

        report
    }

    /// Runs `ticks` ticks without rendering.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step(None);
        }
    }

    /// Draws the current generation into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        frame.draw(&self.grid);
    }

    /// Name of the material at `(x, y)` in the current generation.
    #[must_use]
    pub fn material_at(&self, x: i32, y: i32) -> &str {
        self.grid
            .read(x, y, ReadMode::Current)
            .name(self.grid.registry())
    }

    /// Cell counts of the current generation, paired with material names.
    #[must_use]
    pub fn census(&self) -> Vec<(&str, usize)> {
        self.grid
            .registry()
            .iter()
            .map(|(_, material)| material.name())
            .zip(self.grid.census())
            .collect()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("grid", &self.grid)
            .field("tick", &self.tick)
            .field("queued", &self.queued.len())
            .field("held", &self.held.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrushConfig, GridConfig};
    use crate::error::ConfigError;
    use granule_core::SimError;

    fn config(width: u32, height: u32) -> SimulationConfig {
        SimulationConfig {
            seed: 7,
            grid: GridConfig { width, height },
            brush: BrushConfig { radius: 0, drops: 1 },
            frame_budget_ms: 1_000,
        }
    }

    #[test]
    fn test_creation() {
        let sim = Simulation::new(config(8, 6)).unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.grid().width(), 8);
        assert_eq!(sim.census()[0], ("air", 48));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = Simulation::new(config(0, 6)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_painted_cells_wait_one_tick() {
        let mut sim = Simulation::new(config(5, 5)).unwrap();
        sim.paint(2, 0, "sand").unwrap();

        let report = sim.step(None);
        assert_eq!(report.tick, 0);
        assert_eq!(report.painted, 1);
        assert_eq!(report.pass.skipped, 1);
        assert_eq!(sim.material_at(2, 0), "sand");

        let report = sim.step(None);
        assert_eq!(report.painted, 0);
        assert_eq!(report.pass.moved, 1);
        assert_eq!(sim.material_at(2, 0), "air");
        assert_eq!(sim.material_at(2, 1), "sand");
        assert_eq!(sim.tick(), 2);
    }

    #[test]
    fn test_hold_paints_until_release() {
        let mut sim = Simulation::new(config(5, 8)).unwrap();
        sim.hold(2, 0, "water").unwrap();
        assert_eq!(sim.held_count(), 1);

        for _ in 0..3 {
            assert_eq!(sim.step(None).painted, 1);
        }
        sim.release();
        assert_eq!(sim.held_count(), 0);
        assert_eq!(sim.step(None).painted, 0);

        // Each stamp overwrote the same cell, so only one drop survives and
        // it falls once released.
        assert_eq!(sim.census()[2], ("water", 1));
        assert_eq!(sim.material_at(2, 0), "air");
        assert_eq!(sim.material_at(2, 1), "water");
    }

    #[test]
    fn test_unknown_material() {
        let mut sim = Simulation::new(config(4, 4)).unwrap();
        let err = sim.paint(0, 0, "lava").unwrap_err();
        assert!(matches!(err, SimError::UnknownMaterial { .. }));
        assert!(sim.hold(0, 0, "lava").is_err());
        assert_eq!(sim.held_count(), 0);
    }

    #[test]
    fn test_step_renders_current_generation() {
        let mut sim = Simulation::new(config(3, 3)).unwrap();
        let mut frame = Frame::for_grid(sim.grid());
        sim.grid_mut().write(1, 1, "wall", 0);

        // The wall is still in the next generation while this tick renders.
        sim.step(Some(&mut frame));
        assert_eq!(frame.pixel(1, 1), Some(granule_core::Rgba::SILVER));

        sim.step(Some(&mut frame));
        assert_eq!(frame.pixel(1, 1), Some(granule_core::Rgba::BLACK));
    }

    #[test]
    fn test_stats_accumulate() {
        let mut sim = Simulation::new(config(4, 4)).unwrap();
        sim.run(5);
        assert_eq!(sim.stats().ticks_recorded, 5);
        assert_eq!(sim.grid().generation(), 5);
    }
}
