//! # Core Error Types
//!
//! Construction and lookup failures. Per-cell operations (read, write, swap)
//! never surface these: they degrade to sentinels and silent no-ops so a tick
//! always runs to completion.

use thiserror::Error;

/// Errors raised by the grid, registry and rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A material name that was never registered.
    #[error("unknown material: {name}")]
    UnknownMaterial {
        /// The name that failed to resolve.
        name: String,
    },

    /// A material id past the end of the registry.
    #[error("unknown material id: {0}")]
    UnknownMaterialId(u8),

    /// Coordinates outside `[0, width) x [0, height)`.
    #[error("out of bounds: ({x}, {y})")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// Width or height is zero, or the cell count does not fit the index space.
    #[error("invalid grid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Two materials share a name.
    #[error("duplicate material name: {0}")]
    DuplicateMaterialName(String),

    /// No material named `air` was registered.
    #[error("material list has no `air` entry")]
    MissingAirMaterial,

    /// `air` was registered, but not as the first material.
    #[error("`air` must be registered first (found at index {index})")]
    MisplacedAirMaterial {
        /// Position of `air` in the material list.
        index: usize,
    },

    /// More materials than a one-byte id can address.
    #[error("too many materials: {count} (maximum 256)")]
    TooManyMaterials {
        /// Number of materials supplied.
        count: usize,
    },
}

/// Result type for core operations.
pub type SimResult<T> = Result<T, SimError>;
