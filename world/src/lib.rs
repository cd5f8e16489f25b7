#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map loading for the courier navigation core.
//!
//! Raw map payloads are turned into an immutable [`Grid`] by [`GridBuilder`].
//! Each grid owns the [`TileCatalog`] its symbols resolve against, so legends
//! supplied by one map never leak into another.

mod builder;
mod catalog;
mod grid;
mod shape;

pub use builder::{GridBuildError, GridBuilder, DEFAULT_DIMENSION, MAX_DIMENSION};
pub use catalog::{
    LegendError, TileCatalog, TileColor, TileDefinition, BUILDING_SYMBOL, FALLBACK_SYMBOL,
    PARK_SYMBOL, ROAD_SYMBOL, STREET_SYMBOL, WATER_SYMBOL,
};
pub use courier_core::Terrain;
pub use grid::Grid;
pub use shape::Shape;
