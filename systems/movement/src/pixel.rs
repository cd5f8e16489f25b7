//! Mapping between cell coordinates and pixel-space cell centres.

use courier_core::Cell;
use glam::Vec2;

/// Conversion between cell coordinates and pixel-space cell centres.
///
/// The flip convention only changes these formulas. Adjacency and distance
/// are always computed in un-flipped cell space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelSpace {
    tile_size: f32,
    rows: u32,
    flip_y: bool,
}

impl PixelSpace {
    /// Creates a pixel space for a grid with `rows` rows.
    #[must_use]
    pub const fn new(tile_size: f32, rows: u32, flip_y: bool) -> Self {
        Self {
            tile_size,
            rows,
            flip_y,
        }
    }

    /// Edge length of a cell in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pixel position of the centre of `cell`.
    #[must_use]
    pub fn cell_to_pixel(&self, cell: Cell) -> Vec2 {
        let half = self.tile_size / 2.0;
        let row = if self.flip_y {
            i64::from(self.rows) - 1 - i64::from(cell.y())
        } else {
            i64::from(cell.y())
        };
        Vec2::new(
            cell.x() as f32 * self.tile_size + half,
            row as f32 * self.tile_size + half,
        )
    }

    /// Cell containing the pixel position `pixel`.
    #[must_use]
    pub fn pixel_to_cell(&self, pixel: Vec2) -> Cell {
        let column = (pixel.x / self.tile_size).floor() as i32;
        let row = (pixel.y / self.tile_size).floor() as i32;
        let y = if self.flip_y {
            // rows never exceeds i32::MAX for grids that fit in memory.
            i32::try_from(self.rows).unwrap_or(i32::MAX) - 1 - row
        } else {
            row
        };
        Cell::new(column, y)
    }
}
