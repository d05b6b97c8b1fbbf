//! # Granule Headless Runner
//!
//! Runs a sandbox without a window: pour materials from fixed points, step a
//! number of ticks, then log the census and optionally print the grid.
//!
//! ```text
//! granule_headless --ticks 300 --pour sand@50,0 --pour water@20,0 --dump
//! RUST_LOG=granule=debug granule_headless --config sandbox.toml
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use granule::core::{materials, Probe, AIR_NAME};
use granule::{ConfigResult, Simulation, SimulationConfig};

#[derive(Parser, Debug)]
#[command(
    name = "granule_headless",
    version,
    about = "Run a falling sand simulation without a window"
)]
struct Cli {
    /// TOML config file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width in cells.
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells.
    #[arg(long)]
    height: Option<u32>,

    /// Seed for the bias and brush randomness.
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to run.
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Hold a brush of MATERIAL at X,Y for the whole run (repeatable).
    #[arg(long = "pour", value_name = "MATERIAL@X,Y")]
    pours: Vec<Pour>,

    /// Print the final grid as text.
    #[arg(long)]
    dump: bool,
}

/// A held brush given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Pour {
    material: String,
    x: i32,
    y: i32,
}

impl FromStr for Pour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (material, at) = s
            .split_once('@')
            .ok_or_else(|| format!("expected MATERIAL@X,Y, got `{s}`"))?;
        let (x, y) = at
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y after `@`, got `{at}`"))?;
        let x = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
        let y = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
        if material.is_empty() {
            return Err("material name is empty".to_owned());
        }
        Ok(Self {
            material: material.to_owned(),
            x,
            y,
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn load_config(cli: &Cli) -> ConfigResult<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(width) = cli.width {
        config.grid.width = width;
    }
    if let Some(height) = cli.height {
        config.grid.height = height;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn glyph(name: &str) -> char {
    match name {
        AIR_NAME => '.',
        materials::WALL => '#',
        materials::WATER => '~',
        materials::SAND => ':',
        materials::GAS => '^',
        other => other.chars().next().unwrap_or('?'),
    }
}

fn dump(sim: &Simulation) -> String {
    let grid = sim.grid();
    let registry = grid.registry();
    let mut out = String::with_capacity(grid.cell_count() + grid.height() as usize);
    grid.for_each_cell(|x, _, probe| {
        let c = match probe {
            Probe::Cell(_) => glyph(probe.name(registry)),
            Probe::Unknown(_) | Probe::OutOfBounds => '?',
        };
        out.push(c);
        if x == grid.width() - 1 {
            out.push('\n');
        }
    });
    out
}

fn run(cli: &Cli) -> ConfigResult<()> {
    let config = load_config(cli)?;
    let mut sim = Simulation::new(config)?;

    for pour in &cli.pours {
        sim.hold(pour.x, pour.y, &pour.material)?;
    }

    sim.run(cli.ticks);

    let stats = sim.stats();
    tracing::info!(
        ticks = stats.ticks_recorded,
        avg_ms = stats.avg_tick_ms(),
        max_us = stats.max_tick_us,
        over_budget = stats.ticks_over_budget,
        painted = stats.painted_sum,
        moved = stats.moved_sum,
        "run finished"
    );

    let mut summary = String::new();
    for (name, count) in sim.census() {
        let _ = write!(summary, "{name}={count} ");
    }
    tracing::info!(census = summary.trim_end(), "final census");

    if cli.dump {
        print!("{}", dump(&sim));
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "granule_headless failed");
            ExitCode::FAILURE
        }
    }
}
