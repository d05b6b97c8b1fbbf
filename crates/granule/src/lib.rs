//! # Granule
//!
//! Host layer for the `granule_core` falling sand engine.
//!
//! ```text
//! ┌──────────────────────┐    ┌──────────────────────┐
//! │  SimulationConfig    │───>│  Simulation          │
//! │  (TOML, validated)   │    │  • Grid + rules      │
//! └──────────────────────┘    │  • ChaCha8 bias rng  │
//!                             │  • Brush strokes     │
//!                             └──────────┬───────────┘
//!                                        │ step()
//!                                        v
//!                             ┌──────────────────────┐
//!                             │  Frame (RGBA bytes)  │
//!                             └──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `simulation`: tick driver
//! - `brush`: scatter painting
//! - `frame`: render target
//! - `stats`: tick timing

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod brush;
pub mod config;
pub mod error;
pub mod frame;
pub mod simulation;
pub mod stats;

pub use granule_core as core;

pub use brush::Brush;
pub use config::{BrushConfig, GridConfig, SimulationConfig};
pub use error::{ConfigError, ConfigResult};
pub use frame::Frame;
pub use simulation::Simulation;
pub use stats::{TickReport, TickStatsAccumulator};
