//! # Double-Buffered Cell Grid
//!
//! ## The Problem
//!
//! ```text
//! Row-major pass, single array:
//!   sand at (x, 0) falls to (x, 1)
//!   ... later in the same pass ...
//!   cell (x, 1) is visited, sees sand, moves it again -> teleport
//! ```
//!
//! ## The Solution: Two Generations + Written Mask
//!
//! ```text
//! Tick N:
//!   rules read Generation A (current, never mutated during the pass)
//!   rules write Generation B (next, zero-filled at tick start)
//!   written mask records which cells of B already hold this tick's value
//!
//! End of tick:
//!   clear mask, flip A/B, zero-fill the new next generation
//! ```
//!
//! A [`ReadMode::Latest`] read consults the mask: once a cell has been
//! written this tick it observes the next generation, so a slot vacated
//! earlier in the pass is seen as vacated by every later rule.

mod generation;
mod written;

use std::sync::Arc;

use crate::error::{SimError, SimResult};
use crate::material::{Material, MaterialId, MaterialSet, TypeRegistry};

use generation::Generation;
use written::WrittenMask;

/// Name reported for reads outside the grid rectangle.
pub const OUT_OF_BOUNDS: &str = "out_of_bounds";

/// Name reported for cells holding an unregistered material id.
pub const UNKNOWN: &str = "unknown";

/// Which generation a read observes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Always the current generation.
    #[default]
    Current,
    /// The next generation if the cell was written this tick, else the current one.
    Latest,
}

/// A cell's contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Material id.
    pub material: MaterialId,
    /// Per-material auxiliary byte.
    pub aux: u8,
}

impl Cell {
    /// Creates a cell.
    #[inline]
    #[must_use]
    pub const fn new(material: MaterialId, aux: u8) -> Self {
        Self { material, aux }
    }
}

/// Result of reading one coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// Coordinates outside the grid. Never matches any material.
    OutOfBounds,
    /// The stored byte is not a registered id. Never matches any material.
    Unknown(u8),
    /// A registered material.
    Cell(Cell),
}

impl Probe {
    /// The cell, if this probe hit a registered material.
    #[inline]
    #[must_use]
    pub const fn cell(self) -> Option<Cell> {
        match self {
            Self::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    /// The material id, if this probe hit a registered material.
    #[inline]
    #[must_use]
    pub const fn material(self) -> Option<MaterialId> {
        match self {
            Self::Cell(cell) => Some(cell.material),
            _ => None,
        }
    }

    /// Whether the probe hit a member of `set`.
    #[inline]
    #[must_use]
    pub const fn matches(self, set: &MaterialSet) -> bool {
        match self {
            Self::Cell(cell) => set.contains(cell.material),
            _ => false,
        }
    }

    /// Material name, or [`OUT_OF_BOUNDS`] / [`UNKNOWN`] for the sentinels.
    #[must_use]
    pub fn name(self, registry: &TypeRegistry) -> &str {
        match self {
            Self::OutOfBounds => OUT_OF_BOUNDS,
            Self::Unknown(_) => UNKNOWN,
            Self::Cell(cell) => registry.get(cell.material).map_or(UNKNOWN, Material::name),
        }
    }
}

/// Two generations of columnar cell storage plus the written-this-tick mask.
///
/// Coordinates are `i32` so rules can probe negative offsets freely; every
/// public accessor bounds-checks against `[0, width) x [0, height)` first.
pub struct Grid {
    width: i32,
    height: i32,
    registry: Arc<TypeRegistry>,
    generations: [Generation; 2],
    /// Index of the next (write) generation. Current is `next ^ 1`.
    next: usize,
    written: WrittenMask,
    generation: u64,
}

impl Grid {
    /// Creates a grid and registers `materials` for it.
    ///
    /// # Errors
    ///
    /// Any registration error from [`TypeRegistry::register`], or
    /// [`SimError::InvalidDimensions`] for a zero or oversized dimension.
    pub fn new(width: u32, height: u32, materials: Vec<Material>) -> SimResult<Self> {
        let registry = TypeRegistry::register(materials)?;
        Self::with_registry(width, height, Arc::new(registry))
    }

    /// Creates a grid sharing an existing registry.
    ///
    /// Every cell starts as `air` with aux 0.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidDimensions`] if either dimension is zero or the
    /// cell count exceeds `i32::MAX`.
    pub fn with_registry(width: u32, height: u32, registry: Arc<TypeRegistry>) -> SimResult<Self> {
        let cells = u64::from(width) * u64::from(height);
        if width == 0 || height == 0 || cells > i32::MAX as u64 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        let len = cells as usize;

        let mut grid = Self {
            width: width as i32,
            height: height as i32,
            registry,
            generations: [Generation::new(len), Generation::new(len)],
            next: 1,
            written: WrittenMask::new(len),
            generation: 0,
        };

        // Seed the next generation with air, then make it current.
        grid.generations[grid.next].fill(MaterialId::AIR.raw(), 0);
        grid.flip();
        debug_assert_eq!(grid.generations[grid.next].len(), len);

        tracing::debug!(width, height, materials = grid.registry.len(), "grid constructed");
        Ok(grid)
    }

    /// Grid width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of completed generation flips since construction.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The registry this grid resolves material ids against.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Returns true if `(x, y)` lies inside the grid rectangle.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Flat index with toroidal wraparound. Never out of range, for any input.
    #[inline]
    #[must_use]
    pub const fn wrap_index(&self, x: i32, y: i32) -> usize {
        (y.rem_euclid(self.height) as usize) * (self.width as usize)
            + x.rem_euclid(self.width) as usize
    }

    /// Flat index of an in-bounds coordinate.
    ///
    /// # Errors
    ///
    /// [`SimError::OutOfBounds`] outside the grid rectangle.
    pub fn index_of(&self, x: i32, y: i32) -> SimResult<usize> {
        self.checked_index(x, y).ok_or(SimError::OutOfBounds { x, y })
    }

    #[inline]
    const fn checked_index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(self.wrap_index(x, y))
        } else {
            None
        }
    }

    #[inline]
    const fn current(&self) -> usize {
        self.next ^ 1
    }

    #[inline]
    fn probe_at(&self, source: usize, index: usize) -> Probe {
        match self.generations[source].get(index) {
            Some((raw, aux)) => {
                let material = MaterialId::new(raw);
                if self.registry.contains(material) {
                    Probe::Cell(Cell::new(material, aux))
                } else {
                    Probe::Unknown(raw)
                }
            }
            None => Probe::OutOfBounds,
        }
    }

    /// Reads `(x, y)`.
    ///
    /// Outside the rectangle this returns [`Probe::OutOfBounds`]. With
    /// [`ReadMode::Latest`], a cell already written this tick is read from
    /// the next generation.
    #[inline]
    #[must_use]
    pub fn read(&self, x: i32, y: i32, mode: ReadMode) -> Probe {
        let Some(index) = self.checked_index(x, y) else {
            return Probe::OutOfBounds;
        };
        let source = match mode {
            ReadMode::Latest if self.written.is_marked(index) => self.next,
            _ => self.current(),
        };
        self.probe_at(source, index)
    }

    /// Writes a material by name into the next generation and marks the cell.
    ///
    /// Out-of-bounds coordinates and unknown names are silently discarded;
    /// the return value reports whether the write landed.
    pub fn write(&mut self, x: i32, y: i32, material: &str, aux: u8) -> bool {
        match self.registry.lookup(material) {
            Some(id) => self.write_id(x, y, id, aux),
            None => false,
        }
    }

    /// Writes a material by id into the next generation and marks the cell.
    ///
    /// Out-of-bounds coordinates and unregistered ids are silently discarded.
    #[inline]
    pub fn write_id(&mut self, x: i32, y: i32, material: MaterialId, aux: u8) -> bool {
        if !self.registry.contains(material) {
            return false;
        }
        let Some(index) = self.checked_index(x, y) else {
            return false;
        };
        if self.generations[self.next].set(index, material.raw(), aux) {
            self.written.mark(index);
            true
        } else {
            false
        }
    }

    #[inline]
    fn write_probe(&mut self, x: i32, y: i32, probe: Probe) {
        if let Probe::Cell(cell) = probe {
            self.write_id(x, y, cell.material, cell.aux);
        }
    }

    /// Exchanges two cells into the next generation and marks both.
    ///
    /// The origin is read from the current generation; the target is read
    /// with [`ReadMode::Latest`] so an earlier write to it this tick is kept.
    pub fn swap(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let origin = self.read(x1, y1, ReadMode::Current);
        let target = self.read(x2, y2, ReadMode::Latest);
        self.write_probe(x1, y1, target);
        self.write_probe(x2, y2, origin);
        self.mark_dirty(x1, y1);
        self.mark_dirty(x2, y2);
    }

    /// Swaps `(x, y)` with `(x + dx, y + dy)` if the target's latest material
    /// is in `candidates`.
    ///
    /// Returns `false` without touching anything when it is not (including
    /// out-of-bounds and unknown targets).
    pub fn swap_offset_if_type(
        &mut self,
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
        candidates: &MaterialSet,
    ) -> bool {
        let (tx, ty) = (x.saturating_add(dx), y.saturating_add(dy));
        if self.read(tx, ty, ReadMode::Latest).matches(candidates) {
            self.swap(x, y, tx, ty);
            true
        } else {
            false
        }
    }

    /// Name-based form of [`Grid::swap_offset_if_type`].
    ///
    /// Resolves names on every call; rules on the hot path should use a
    /// precomputed [`MaterialSet`].
    pub fn swap_offset_if_named(
        &mut self,
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
        candidates: &[&str],
    ) -> bool {
        let set = self.registry.set_of(candidates);
        self.swap_offset_if_type(x, y, dx, dy, &set)
    }

    /// Returns true if `(x, y)` was written this tick. False out of bounds.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self, x: i32, y: i32) -> bool {
        self.checked_index(x, y)
            .is_some_and(|index| self.written.is_marked(index))
    }

    /// Marks `(x, y)` as written this tick. Ignored out of bounds.
    #[inline]
    pub fn mark_dirty(&mut self, x: i32, y: i32) {
        if let Some(index) = self.checked_index(x, y) {
            self.written.mark(index);
        }
    }

    /// Number of cells written this tick.
    #[inline]
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.written.count()
    }

    /// Resets every written flag. Run once per tick, after the update pass.
    pub fn clear_dirty_mask(&mut self) {
        self.written.clear();
    }

    /// Makes the next generation current and zero-fills the new next one.
    ///
    /// Run exactly once per tick, after the update pass and mask clear.
    pub fn advance_generation(&mut self) {
        self.flip();
        self.generation += 1;
    }

    fn flip(&mut self) {
        self.next ^= 1;
        self.generations[self.next].fill(MaterialId::AIR.raw(), 0);
    }

    /// Row-major iterator over the current generation.
    #[must_use]
    pub fn cells(&self) -> Cells<'_> {
        Cells {
            grid: self,
            index: 0,
        }
    }

    /// Visits every cell of the current generation in row-major order.
    pub fn for_each_cell<F>(&self, mut visit: F)
    where
        F: FnMut(i32, i32, Probe),
    {
        for (x, y, probe) in self.cells() {
            visit(x, y, probe);
        }
    }

    /// Cell counts of the current generation, indexed by material id.
    ///
    /// Unregistered ids are not counted.
    #[must_use]
    pub fn census(&self) -> Vec<usize> {
        let mut counts = vec![0; self.registry.len()];
        for &raw in self.generations[self.current()].materials() {
            if let Some(count) = counts.get_mut(raw as usize) {
                *count += 1;
            }
        }
        counts
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("generation", &self.generation)
            .field("dirty", &self.written.count())
            .finish_non_exhaustive()
    }
}

/// Row-major iterator over the current generation, yielding `(x, y, probe)`.
pub struct Cells<'a> {
    grid: &'a Grid,
    index: usize,
}

impl Iterator for Cells<'_> {
    type Item = (i32, i32, Probe);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.grid.cell_count() {
            return None;
        }
        let width = self.grid.width as usize;
        let (x, y) = ((self.index % width) as i32, (self.index / width) as i32);
        let probe = self.grid.probe_at(self.grid.current(), self.index);
        self.index += 1;
        Some((x, y, probe))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.cell_count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials;

    fn grid(width: u32, height: u32) -> Grid {
        Grid::new(width, height, materials::standard()).unwrap()
    }

    fn id(grid: &Grid, name: &str) -> MaterialId {
        grid.registry().id_of(name).unwrap()
    }

    #[test]
    fn test_new_grid_is_all_air() {
        let grid = grid(4, 3);
        assert_eq!(grid.cell_count(), 12);
        assert_eq!(grid.generation(), 0);
        assert_eq!(grid.dirty_count(), 0);
        assert!(grid
            .cells()
            .all(|(_, _, probe)| probe == Probe::Cell(Cell::new(MaterialId::AIR, 0))));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Grid::new(0, 5, materials::standard()).unwrap_err(),
            SimError::InvalidDimensions { width: 0, height: 5 }
        );
        assert_eq!(
            Grid::new(5, 0, materials::standard()).unwrap_err(),
            SimError::InvalidDimensions { width: 5, height: 0 }
        );
        assert!(Grid::new(u32::MAX, 2, materials::standard()).is_err());
    }

    #[test]
    fn test_wrap_index_formula() {
        let grid = grid(5, 4);
        assert_eq!(grid.wrap_index(0, 0), 0);
        assert_eq!(grid.wrap_index(4, 3), 19);
        assert_eq!(grid.wrap_index(-1, 0), 4);
        assert_eq!(grid.wrap_index(0, -1), 15);
        assert_eq!(grid.wrap_index(5, 4), 0);
        assert_eq!(grid.wrap_index(i32::MIN, i32::MAX), grid.wrap_index(i32::MIN.rem_euclid(5), i32::MAX.rem_euclid(4)));
    }

    #[test]
    fn test_index_of_rejects_out_of_bounds() {
        let grid = grid(3, 3);
        assert_eq!(grid.index_of(2, 1), Ok(5));
        assert_eq!(grid.index_of(3, 0), Err(SimError::OutOfBounds { x: 3, y: 0 }));
    }

    #[test]
    fn test_write_targets_next_generation() {
        let mut grid = grid(3, 3);
        let sand = id(&grid, "sand");
        assert!(grid.write(1, 1, "sand", 9));

        assert!(grid.is_dirty(1, 1));
        assert_eq!(grid.read(1, 1, ReadMode::Current).material(), Some(MaterialId::AIR));
        assert_eq!(
            grid.read(1, 1, ReadMode::Latest),
            Probe::Cell(Cell::new(sand, 9))
        );
    }

    #[test]
    fn test_discarded_writes() {
        let mut grid = grid(3, 3);
        assert!(!grid.write(-1, 0, "sand", 1));
        assert!(!grid.write(0, 3, "sand", 1));
        assert!(!grid.write(0, 0, "plasma", 1));
        assert!(!grid.write_id(0, 0, MaterialId::new(77), 1));
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn test_latest_read_falls_back_when_clean() {
        let mut grid = grid(2, 2);
        grid.write(0, 0, "wall", 3);
        grid.clear_dirty_mask();
        grid.advance_generation();

        assert_eq!(
            grid.read(0, 0, ReadMode::Latest),
            grid.read(0, 0, ReadMode::Current)
        );
    }

    #[test]
    fn test_advance_zero_fills_next() {
        let mut grid = grid(2, 1);
        grid.write(0, 0, "water", 50);
        grid.clear_dirty_mask();
        grid.advance_generation();
        assert_eq!(grid.generation(), 1);

        // Nothing rewrote the water; after another flip it decays to air.
        grid.clear_dirty_mask();
        grid.advance_generation();
        assert_eq!(grid.read(0, 0, ReadMode::Current).material(), Some(MaterialId::AIR));
    }

    #[test]
    fn test_swap_reads_target_latest() {
        let mut grid = grid(3, 1);
        let (water, gas) = (id(&grid, "water"), id(&grid, "gas"));
        grid.write(0, 0, "water", 1);
        grid.clear_dirty_mask();
        grid.advance_generation();

        // Something earlier in the pass moved gas into (1, 0).
        grid.write(1, 0, "gas", 2);
        grid.swap(0, 0, 1, 0);

        assert_eq!(grid.read(0, 0, ReadMode::Latest), Probe::Cell(Cell::new(gas, 2)));
        assert_eq!(grid.read(1, 0, ReadMode::Latest), Probe::Cell(Cell::new(water, 1)));
        assert!(grid.is_dirty(0, 0) && grid.is_dirty(1, 0));
    }

    #[test]
    fn test_swap_offset_rejects_out_of_bounds_target() {
        let mut grid = grid(2, 2);
        let anything = grid.registry().set_of(&["air", "wall", "water", "sand", "gas"]);
        assert!(!grid.swap_offset_if_type(0, 0, -1, 0, &anything));
        assert!(!grid.swap_offset_if_type(1, 1, 0, 1, &anything));
        assert!(!grid.swap_offset_if_type(1, 1, i32::MAX, i32::MAX, &anything));
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn test_swap_offset_by_name() {
        let mut grid = grid(1, 2);
        grid.write(0, 0, "sand", 4);
        grid.clear_dirty_mask();
        grid.advance_generation();

        assert!(grid.swap_offset_if_named(0, 0, 0, 1, &["air"]));
        assert_eq!(grid.read(0, 1, ReadMode::Latest).material(), Some(id(&grid, "sand")));
    }

    #[test]
    fn test_unknown_ids_read_as_sentinel() {
        let mut grid = grid(2, 1);
        let current = grid.current();
        grid.generations[current].set(1, 200, 5);

        let probe = grid.read(1, 0, ReadMode::Current);
        assert_eq!(probe, Probe::Unknown(200));
        assert_eq!(probe.name(grid.registry()), UNKNOWN);
        assert!(!probe.matches(&grid.registry().set_of(&["air"])));
        assert_eq!(grid.census(), vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_probe_names() {
        let mut grid = grid(2, 2);
        grid.write(1, 1, "gas", 0);
        assert_eq!(grid.read(1, 1, ReadMode::Latest).name(grid.registry()), "gas");
        assert_eq!(grid.read(5, 5, ReadMode::Latest).name(grid.registry()), OUT_OF_BOUNDS);
    }

    #[test]
    fn test_cells_is_row_major_and_restartable() {
        let grid = grid(3, 2);
        let order: Vec<(i32, i32)> = grid.cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        assert_eq!(grid.cells().len(), 6);

        let mut visits = 0;
        grid.for_each_cell(|_, _, _| visits += 1);
        assert_eq!(visits, 6);
    }
}
