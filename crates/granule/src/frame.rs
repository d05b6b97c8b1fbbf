//! # Render Target
//!
//! A CPU-side RGBA image, one pixel per cell. Front ends upload
//! [`Frame::as_bytes`] straight into a texture.

use granule_core::{Grid, Probe, Rgba};

/// Color drawn for cells whose id is not registered.
pub const UNKNOWN_COLOR: Rgba = Rgba::YELLOW;

/// Row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Frame {
    /// Creates a transparent black frame.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::default(); width as usize * height as usize],
        }
    }

    /// Creates a frame matching the grid's dimensions.
    #[must_use]
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.width() as u32, grid.height() as u32)
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// The pixels as tightly packed RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Paints the grid's current generation into this frame.
    ///
    /// The frame is resized first if its dimensions differ from the grid's.
    pub fn draw(&mut self, grid: &Grid) {
        let (width, height) = (grid.width() as u32, grid.height() as u32);
        if (self.width, self.height) != (width, height) {
            *self = Self::new(width, height);
        }

        let registry = grid.registry();
        let stride = self.width as usize;
        let pixels = &mut self.pixels;
        grid.for_each_cell(|x, y, probe| {
            let color = match probe {
                Probe::Cell(cell) => registry
                    .get(cell.material)
                    .map_or(UNKNOWN_COLOR, |material| material.color(cell.aux)),
                Probe::Unknown(_) | Probe::OutOfBounds => UNKNOWN_COLOR,
            };
            pixels[y as usize * stride + x as usize] = color;
        });
    }
}
