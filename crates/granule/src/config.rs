//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file) gives the classic 100x100 sandbox.
//!
//! ```toml
//! seed = 42
//! frame_budget_ms = 16
//!
//! [grid]
//! width = 160
//! height = 120
//!
//! [brush]
//! radius = 5
//! drops = 20
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Largest brush radius accepted from config.
pub const MAX_BRUSH_RADIUS: i32 = 1024;

/// Grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
        }
    }
}

/// Scatter brush used for painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrushConfig {
    /// Half-width of the square the drops land in.
    pub radius: i32,
    /// Cells written per stamp.
    pub drops: u32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            drops: 20,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for the movement bias and brush scatter.
    pub seed: u64,
    /// Ticks slower than this are logged as warnings.
    pub frame_budget_ms: u64,
    /// Grid dimensions.
    pub grid: GridConfig,
    /// Brush settings.
    pub brush: BrushConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0x5A4D_F411,
            frame_budget_ms: 16,
            grid: GridConfig::default(),
            brush: BrushConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SimulationConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    /// Renders the config as TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if !(0..=MAX_BRUSH_RADIUS).contains(&self.brush.radius) {
            return Err(ConfigError::Invalid(format!(
                "brush radius must be in 0..={MAX_BRUSH_RADIUS}, got {}",
                self.brush.radius
            )));
        }
        Ok(())
    }
}
