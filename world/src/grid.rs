//! Immutable walkability grid.

use std::fmt;

use courier_core::{Cell, Terrain};
use serde_json::{json, Value};

use crate::catalog::{TileCatalog, TileDefinition};

/// Rectangular array of tile symbols together with the catalog that gives
/// them meaning.
///
/// Grids are produced by [`crate::GridBuilder`] and never change afterwards.
/// Every row holds exactly `width` symbols and there are exactly `height`
/// rows.
#[derive(Clone, Debug)]
pub struct Grid {
    name: String,
    width: u32,
    height: u32,
    rows: Vec<Vec<char>>,
    catalog: TileCatalog,
}

impl Grid {
    pub(crate) fn from_parts(
        name: String,
        width: u32,
        height: u32,
        rows: Vec<Vec<char>>,
        catalog: TileCatalog,
    ) -> Self {
        debug_assert_eq!(rows.len(), height as usize);
        debug_assert!(rows.iter().all(|row| row.len() == width as usize));
        Self {
            name,
            width,
            height,
            rows,
            catalog,
        }
    }

    /// Display name of the map.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog the grid's symbols resolve against.
    #[must_use]
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Symbol stored at `cell`, if it lies within the grid.
    #[must_use]
    pub fn symbol_at(&self, cell: Cell) -> Option<char> {
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        self.rows.get(y)?.get(x).copied()
    }

    /// Tile definition at `cell`, if it lies within the grid.
    #[must_use]
    pub fn tile_at(&self, cell: Cell) -> Option<&TileDefinition> {
        self.symbol_at(cell)
            .map(|symbol| self.catalog.lookup(symbol))
    }

    /// Iterator over the rows from row 0 downwards.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Cell closest to the middle of the grid, a sensible spawn point.
    #[must_use]
    pub fn center(&self) -> Cell {
        let half = |value: u32| i32::try_from(value / 2).unwrap_or(i32::MAX);
        Cell::new(half(self.width), half(self.height))
    }

    /// Exports the grid as a `{name, width, height, tiles}` payload with one
    /// string per row, suitable for feeding back into the builder.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let tiles: Vec<String> = self.rows.iter().map(|row| row.iter().collect()).collect();
        json!({
            "name": self.name,
            "width": self.width,
            "height": self.height,
            "tiles": tiles,
        })
    }
}

impl Terrain for Grid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_walkable(&self, cell: Cell) -> bool {
        self.tile_at(cell).is_some_and(TileDefinition::walkable)
    }

    fn speed_at(&self, cell: Cell) -> f32 {
        self.tile_at(cell).map_or(0.0, TileDefinition::speed_factor)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for symbol in row {
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}
