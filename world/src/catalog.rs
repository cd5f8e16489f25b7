//! Tile symbol catalog and legend merging.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Reserved symbol that every unknown symbol resolves to.
pub const FALLBACK_SYMBOL: char = '?';
/// Walkable symbol used as the canvas when rasterizing geometry.
pub const STREET_SYMBOL: char = 'C';
/// Symbol painted for rasterized roads.
pub const ROAD_SYMBOL: char = 'R';
/// Symbol painted for rasterized buildings.
pub const BUILDING_SYMBOL: char = 'B';
/// Walkable green space.
pub const PARK_SYMBOL: char = 'P';
/// Impassable water.
pub const WATER_SYMBOL: char = 'W';

const UNKNOWN_LEGEND_COLOR: TileColor = TileColor::from_rgb(128, 128, 128);

/// Render hint attached to a tile definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TileColor {
    /// Creates a new tile color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses `#RRGGBB` or `#RGB` notation. The leading `#` is optional.
    #[must_use]
    pub fn parse_hex(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |text: &str| u8::from_str_radix(text, 16).ok();
        match digits.len() {
            6 => Some(Self::from_rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let mut expanded = digits.chars().map(|c| channel(&format!("{c}{c}")));
                Some(Self::from_rgb(
                    expanded.next()??,
                    expanded.next()??,
                    expanded.next()??,
                ))
            }
            _ => None,
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Properties of a single tile symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct TileDefinition {
    symbol: char,
    name: String,
    walkable: bool,
    speed_factor: f32,
    color: TileColor,
}

impl TileDefinition {
    /// Creates a new definition. Negative speed factors are clamped to zero.
    #[must_use]
    pub fn new(
        symbol: char,
        name: impl Into<String>,
        walkable: bool,
        speed_factor: f32,
        color: TileColor,
    ) -> Self {
        Self {
            symbol,
            name: name.into(),
            walkable,
            speed_factor: speed_factor.max(0.0),
            color,
        }
    }

    /// Symbol identifying the tile.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.symbol
    }

    /// Human-readable display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a token may occupy the tile.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Relative movement speed on the tile.
    #[must_use]
    pub const fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Render hint for the tile.
    #[must_use]
    pub const fn color(&self) -> TileColor {
        self.color
    }
}

/// Symbol to [`TileDefinition`] mapping owned by a single grid.
///
/// Lookups never fail: unknown symbols resolve to the reserved
/// [`FALLBACK_SYMBOL`] definition, which is never walkable.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    definitions: HashMap<char, TileDefinition>,
    fallback: TileDefinition,
}

impl TileCatalog {
    /// Resolves `symbol`, falling back to the reserved unknown definition.
    #[must_use]
    pub fn lookup(&self, symbol: char) -> &TileDefinition {
        self.definitions.get(&symbol).unwrap_or(&self.fallback)
    }

    /// Reports whether `symbol` has its own definition.
    #[must_use]
    pub fn contains(&self, symbol: char) -> bool {
        symbol == FALLBACK_SYMBOL || self.definitions.contains_key(&symbol)
    }

    /// Definition every unknown symbol resolves to.
    #[must_use]
    pub fn fallback(&self) -> &TileDefinition {
        &self.fallback
    }

    /// Merges a map-supplied legend into the catalog.
    ///
    /// Each entry maps a single-character symbol to an object with optional
    /// `name`, `walkable`, `speed` and `color` fields. Missing fields keep the
    /// symbol's existing definition, or the legend defaults for new symbols.
    /// Malformed entries are logged and skipped; the remaining entries are
    /// still applied. The skipped entries are returned to the caller.
    pub fn extend_from_legend(&mut self, legend: &Map<String, Value>) -> Vec<LegendError> {
        let mut skipped = Vec::new();

        for (key, value) in legend {
            match self.parse_legend_entry(key, value) {
                Ok(definition) => {
                    let _ = self.definitions.insert(definition.symbol, definition);
                }
                Err(error) => {
                    warn!(symbol = %key, %error, "skipping malformed legend entry");
                    skipped.push(error);
                }
            }
        }

        skipped
    }

    fn parse_legend_entry(&self, key: &str, value: &Value) -> Result<TileDefinition, LegendError> {
        let mut chars = key.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(symbol), None) => symbol,
            _ => return Err(LegendError::InvalidSymbol(key.to_owned())),
        };
        if symbol == FALLBACK_SYMBOL {
            return Err(LegendError::ReservedSymbol(symbol));
        }

        let entry =
            LegendEntry::deserialize(value).map_err(|source| LegendError::InvalidEntry {
                symbol,
                source,
            })?;

        let existing = self.definitions.get(&symbol);
        let speed_factor = match entry.speed {
            Some(speed) if !speed.is_finite() || speed < 0.0 => {
                return Err(LegendError::InvalidSpeed { symbol, speed });
            }
            Some(speed) => speed,
            None => existing.map_or(0.0, TileDefinition::speed_factor),
        };
        let color = match entry.color {
            Some(text) => TileColor::parse_hex(&text)
                .ok_or(LegendError::InvalidColor { symbol, color: text })?,
            None => existing.map_or(UNKNOWN_LEGEND_COLOR, TileDefinition::color),
        };

        Ok(TileDefinition {
            symbol,
            name: entry
                .name
                .or_else(|| existing.map(|definition| definition.name.clone()))
                .unwrap_or_else(|| symbol.to_string()),
            walkable: entry
                .walkable
                .or_else(|| existing.map(TileDefinition::walkable))
                .unwrap_or(false),
            speed_factor,
            color,
        })
    }
}

impl Default for TileCatalog {
    /// Catalog with the built-in city tiles.
    fn default() -> Self {
        let builtins = [
            TileDefinition::new(
                STREET_SYMBOL,
                "Street",
                true,
                1.0,
                TileColor::from_rgb(211, 211, 211),
            ),
            TileDefinition::new(
                ROAD_SYMBOL,
                "Road",
                true,
                1.5,
                TileColor::from_rgb(169, 169, 169),
            ),
            TileDefinition::new(
                BUILDING_SYMBOL,
                "Building",
                false,
                0.0,
                TileColor::from_rgb(101, 67, 33),
            ),
            TileDefinition::new(
                PARK_SYMBOL,
                "Park",
                true,
                0.8,
                TileColor::from_rgb(0, 100, 0),
            ),
            TileDefinition::new(
                WATER_SYMBOL,
                "Water",
                false,
                0.0,
                TileColor::from_rgb(0, 0, 255),
            ),
        ];

        Self {
            definitions: builtins
                .into_iter()
                .map(|definition| (definition.symbol, definition))
                .collect(),
            fallback: TileDefinition::new(
                FALLBACK_SYMBOL,
                "Unknown",
                false,
                0.0,
                TileColor::from_rgb(255, 0, 0),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LegendEntry {
    name: Option<String>,
    walkable: Option<bool>,
    #[serde(alias = "speed_factor")]
    speed: Option<f32>,
    color: Option<String>,
}

/// A legend entry that could not be merged into the catalog.
#[derive(Debug, Error)]
pub enum LegendError {
    /// Legend keys must be exactly one character long.
    #[error("legend key {0:?} is not a single character")]
    InvalidSymbol(String),
    /// The fallback symbol cannot be redefined.
    #[error("legend may not redefine the reserved symbol {0:?}")]
    ReservedSymbol(char),
    /// The entry could not be decoded.
    #[error("legend entry for {symbol:?} is malformed: {source}")]
    InvalidEntry {
        /// Symbol the entry describes.
        symbol: char,
        /// Decoding failure.
        source: serde_json::Error,
    },
    /// Speed factors must be finite and non-negative.
    #[error("legend entry for {symbol:?} has invalid speed {speed}")]
    InvalidSpeed {
        /// Symbol the entry describes.
        symbol: char,
        /// Rejected speed value.
        speed: f32,
    },
    /// The color was not `#RRGGBB` or `#RGB` hex.
    #[error("legend entry for {symbol:?} has invalid color {color:?}")]
    InvalidColor {
        /// Symbol the entry describes.
        symbol: char,
        /// Rejected color text.
        color: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legend(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected legend object, got {other}"),
        }
    }

    #[test]
    fn unknown_symbols_resolve_to_blocked_fallback() {
        let catalog = TileCatalog::default();
        for symbol in ['x', 'Z', '#', ' ', FALLBACK_SYMBOL] {
            let definition = catalog.lookup(symbol);
            assert_eq!(definition.symbol(), FALLBACK_SYMBOL);
            assert!(!definition.walkable());
        }
    }

    #[test]
    fn builtins_match_city_palette() {
        let catalog = TileCatalog::default();
        assert!(catalog.lookup(STREET_SYMBOL).walkable());
        assert!((catalog.lookup(ROAD_SYMBOL).speed_factor() - 1.5).abs() < f32::EPSILON);
        assert!(!catalog.lookup(BUILDING_SYMBOL).walkable());
        assert!(!catalog.lookup(WATER_SYMBOL).walkable());
    }

    #[test]
    fn legend_overrides_keep_unspecified_fields() {
        let mut catalog = TileCatalog::default();
        let skipped =
            catalog.extend_from_legend(&legend(json!({ "R": { "speed": 2.0 } })));

        assert!(skipped.is_empty());
        let road = catalog.lookup(ROAD_SYMBOL);
        assert_eq!(road.name(), "Road");
        assert!(road.walkable());
        assert!((road.speed_factor() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn legend_adds_new_symbols_with_defaults() {
        let mut catalog = TileCatalog::default();
        let skipped = catalog.extend_from_legend(&legend(json!({
            "S": { "name": "Sidewalk", "walkable": true, "color": "#abc" },
            "T": {}
        })));

        assert!(skipped.is_empty());
        let sidewalk = catalog.lookup('S');
        assert_eq!(sidewalk.name(), "Sidewalk");
        assert!(sidewalk.walkable());
        assert_eq!(sidewalk.color(), TileColor::from_rgb(0xaa, 0xbb, 0xcc));
        assert_eq!(sidewalk.speed_factor(), 0.0);

        let bare = catalog.lookup('T');
        assert_eq!(bare.name(), "T");
        assert!(!bare.walkable());
        assert_eq!(bare.color(), UNKNOWN_LEGEND_COLOR);
    }

    #[test]
    fn malformed_entries_are_skipped_without_aborting() {
        let mut catalog = TileCatalog::default();
        let skipped = catalog.extend_from_legend(&legend(json!({
            "A": { "walkable": "sometimes" },
            "B": { "speed": -1.0 },
            "D": { "color": "#zzzzzz" },
            "LONG": { "walkable": true },
            "?": { "walkable": true },
            "E": "not an object",
            "G": { "name": "Grass", "walkable": true, "speed": 0.9 }
        })));

        assert_eq!(skipped.len(), 6);
        assert!(skipped
            .iter()
            .any(|error| matches!(error, LegendError::ReservedSymbol('?'))));
        assert!(skipped
            .iter()
            .any(|error| matches!(error, LegendError::InvalidSymbol(key) if key == "LONG")));
        assert!(catalog.lookup('G').walkable());
        assert!(!catalog.contains('A'));
        assert!(!catalog.lookup(BUILDING_SYMBOL).walkable());
        assert!(!catalog.lookup(FALLBACK_SYMBOL).walkable());
    }

    #[test]
    fn parse_hex_accepts_long_and_short_forms() {
        assert_eq!(
            TileColor::parse_hex("#102030"),
            Some(TileColor::from_rgb(0x10, 0x20, 0x30))
        );
        assert_eq!(
            TileColor::parse_hex("f0a"),
            Some(TileColor::from_rgb(0xff, 0x00, 0xaa))
        );
        assert_eq!(TileColor::parse_hex("#12345"), None);
        assert_eq!(TileColor::parse_hex("#gg0000"), None);
    }
}
