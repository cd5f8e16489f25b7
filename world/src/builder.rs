//! Conversion of raw map payloads into [`Grid`] values.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    catalog::{TileCatalog, BUILDING_SYMBOL, FALLBACK_SYMBOL, ROAD_SYMBOL, STREET_SYMBOL},
    grid::Grid,
    shape::{Scalar, Shape},
};

/// Width and height used when a payload carries no tile matrix and no
/// dimension hints.
pub const DEFAULT_DIMENSION: u32 = 30;

/// Largest width or height a grid may have. Hints above it are ignored and
/// tile matrices are truncated to it, which caps a grid at
/// `MAX_DIMENSION * MAX_DIMENSION` cells.
pub const MAX_DIMENSION: u32 = 4096;

const DEFAULT_NAME: &str = "Unknown";
const NAME_KEYS: [&str; 2] = ["city_name", "name"];
const WIDTH_KEYS: [&str; 3] = ["width", "cols", "columns"];
const HEIGHT_KEYS: [&str; 3] = ["height", "rows", "rows_count"];
const MATRIX_KEYS: [&str; 2] = ["tiles", "map"];

/// Errors raised for construction arguments that are invalid outright.
///
/// Missing or garbled payload content never produces an error; it degrades to
/// a default grid instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridBuildError {
    /// A dimension hint was explicitly supplied as a negative number.
    #[error("map {field} must not be negative, got {value}")]
    NegativeDimension {
        /// Payload key carrying the hint.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },
}

/// Builds grids from map payloads.
///
/// A payload is a JSON object that either carries a tile matrix under `tiles`
/// (or `map`), or `buildings` and `roads` geometry lists that are rasterized
/// onto a walkable street canvas. An optional `legend` object extends the
/// builder's catalog before the grid is handed out.
#[derive(Clone, Debug, Default)]
pub struct GridBuilder {
    catalog: TileCatalog,
}

impl GridBuilder {
    /// Creates a builder backed by the built-in tile catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `json` and builds a grid from it. Text that is not valid JSON
    /// is treated as an empty payload.
    pub fn build_from_str(self, json: &str) -> Result<Grid, GridBuildError> {
        let payload = serde_json::from_str(json).unwrap_or_else(|error| {
            warn!(%error, "map payload is not valid json; using defaults");
            Value::Null
        });
        self.build(&payload)
    }

    /// Builds a grid from a decoded payload.
    pub fn build(mut self, payload: &Value) -> Result<Grid, GridBuildError> {
        let empty = Map::new();
        let fields = payload.as_object().unwrap_or_else(|| {
            if !payload.is_null() {
                warn!("map payload is not an object; using defaults");
            }
            &empty
        });

        let name = NAME_KEYS
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .unwrap_or(DEFAULT_NAME)
            .to_owned();
        let width_hint = dimension_hint(fields, &WIDTH_KEYS)?;
        let height_hint = dimension_hint(fields, &HEIGHT_KEYS)?;

        let (width, height, rows) = match tile_matrix(fields) {
            Some(matrix) => {
                let normalized: Vec<Vec<char>> = matrix.iter().map(normalize_row).collect();
                let width = width_hint
                    .unwrap_or_else(|| normalized.first().map_or(0, |row| len_u32(row.len())))
                    .clamp(1, MAX_DIMENSION);
                let height = height_hint
                    .unwrap_or_else(|| len_u32(normalized.len()))
                    .clamp(1, MAX_DIMENSION);
                (width, height, fit_matrix(normalized, width, height))
            }
            None => {
                let width = width_hint.unwrap_or(DEFAULT_DIMENSION);
                let height = height_hint.unwrap_or(DEFAULT_DIMENSION);
                (width, height, rasterize(fields, width, height))
            }
        };

        match fields.get("legend") {
            Some(Value::Object(legend)) => {
                let skipped = self.catalog.extend_from_legend(legend);
                debug!(
                    entries = legend.len(),
                    skipped = skipped.len(),
                    "applied map legend"
                );
            }
            Some(Value::Null) | None => {}
            Some(_) => warn!("map legend is not an object; ignoring it"),
        }

        debug!(%name, width, height, "built grid");
        Ok(Grid::from_parts(name, width, height, rows, self.catalog))
    }
}

fn dimension_hint(
    fields: &Map<String, Value>,
    keys: &[&'static str],
) -> Result<Option<u32>, GridBuildError> {
    for &key in keys {
        let Some(value) = fields.get(key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        let parsed = Scalar::deserialize(value)
            .ok()
            .and_then(|scalar| scalar.to_integer());
        match parsed {
            Some(number) if number < 0 => {
                return Err(GridBuildError::NegativeDimension {
                    field: key,
                    value: number,
                });
            }
            Some(0) => {}
            Some(number) => match u32::try_from(number) {
                Ok(dimension) if dimension <= MAX_DIMENSION => return Ok(Some(dimension)),
                _ => warn!(
                    field = key,
                    number,
                    max = MAX_DIMENSION,
                    "map dimension too large; ignoring it"
                ),
            },
            None => warn!(field = key, %value, "map dimension is not a number; ignoring it"),
        }
    }

    Ok(None)
}

fn tile_matrix(fields: &Map<String, Value>) -> Option<&Vec<Value>> {
    MATRIX_KEYS.iter().find_map(|key| match fields.get(*key) {
        Some(Value::Array(rows)) if !rows.is_empty() => Some(rows),
        Some(Value::Array(_)) | Some(Value::Null) | None => None,
        Some(_) => {
            warn!(field = *key, "tile matrix is not a list of rows; ignoring it");
            None
        }
    })
}

fn normalize_row(row: &Value) -> Vec<char> {
    match row {
        Value::String(text) => text.chars().collect(),
        Value::Array(symbols) => symbols.iter().map(normalize_symbol).collect(),
        _ => Vec::new(),
    }
}

fn normalize_symbol(value: &Value) -> char {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return FALLBACK_SYMBOL,
    };

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => symbol,
        _ => FALLBACK_SYMBOL,
    }
}

fn fit_matrix(mut rows: Vec<Vec<char>>, width: u32, height: u32) -> Vec<Vec<char>> {
    let width = width as usize;
    let height = height as usize;

    rows.truncate(height);
    for row in &mut rows {
        row.resize(width, FALLBACK_SYMBOL);
    }
    rows.resize_with(height, || vec![FALLBACK_SYMBOL; width]);
    rows
}

fn rasterize(fields: &Map<String, Value>, width: u32, height: u32) -> Vec<Vec<char>> {
    let mut rows = vec![vec![STREET_SYMBOL; width as usize]; height as usize];

    let layers: [(&str, fn(&Value) -> Option<Shape>, char); 2] = [
        ("buildings", Shape::from_building, BUILDING_SYMBOL),
        ("roads", Shape::from_road, ROAD_SYMBOL),
    ];
    for (key, decode, symbol) in layers {
        let Some(entries) = fields.get(key).and_then(Value::as_array) else {
            continue;
        };

        let mut ignored = 0_usize;
        for entry in entries {
            match decode(entry) {
                Some(shape) => shape.for_each_clipped(width, height, |x, y| rows[y][x] = symbol),
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            debug!(layer = key, ignored, "ignored unrecognized map geometry");
        }
    }

    rows
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
