//! # Granule Core Engine
//!
//! Discrete-time falling sand cellular automaton:
//! - One byte of material id and one aux byte per cell
//! - Two generations, columnar, allocated once
//! - Row-major update pass with at-most-once movement per tick
//!
//! ## Tick Contract
//!
//! The host must drive each tick in exactly this order:
//!
//! ```text
//! rules.update_all(&mut grid, &mut rng)   // mutate next generation
//! grid.for_each_cell(render)              // read current generation
//! grid.clear_dirty_mask()
//! grid.advance_generation()               // flip, zero-fill new next
//! ```
//!
//! ## Example
//!
//! ```rust
//! use granule_core::{materials, Grid, ReadMode, RulesEngine};
//! use rand::SeedableRng;
//!
//! let mut grid = Grid::new(8, 8, materials::standard()).unwrap();
//! let rules = RulesEngine::for_grid(&grid);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//!
//! grid.write(3, 0, "sand", 200);
//! grid.clear_dirty_mask();
//! grid.advance_generation();
//!
//! rules.update_all(&mut grid, &mut rng);
//! grid.clear_dirty_mask();
//! grid.advance_generation();
//!
//! let below = grid.read(3, 1, ReadMode::Current);
//! assert_eq!(below.name(grid.registry()), "sand");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod grid;
pub mod material;
pub mod materials;
pub mod rules;

pub use error::{SimError, SimResult};
pub use grid::{Cell, Cells, Grid, Probe, ReadMode, OUT_OF_BOUNDS, UNKNOWN};
pub use material::{
    Behavior, ColorFn, CompiledMove, Material, MaterialId, MaterialSet, Move, Plan, Rgba, Step,
    TypeRegistry, UpdateFn, AIR_NAME, MAX_MATERIALS,
};
pub use rules::{Outcome, PassStats, RulesEngine};
