//! Geometry primitives decoded from map payloads.
//!
//! Building and road entries arrive in several loosely-typed layouts. Each
//! entry is decoded exactly once into a [`Shape`]; entries that match no known
//! layout are dropped by the caller.

use courier_core::Cell;
use serde::Deserialize;
use serde_json::Value;

/// Geometry that can be rasterized onto a grid canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned rectangle anchored at its upper-left cell.
    Rectangle {
        /// Upper-left cell of the rectangle.
        origin: Cell,
        /// Number of columns covered. Non-positive values cover nothing.
        width: i32,
        /// Number of rows covered. Non-positive values cover nothing.
        height: i32,
    },
    /// Unordered set of individual cells.
    CellList(Vec<Cell>),
    /// Ordered sequence of cells such as a road centre line.
    Path(Vec<Cell>),
}

impl Shape {
    /// Decodes a building entry: a rectangle, a `cells` object or a bare
    /// point list.
    #[must_use]
    pub fn from_building(value: &Value) -> Option<Self> {
        if let Value::Array(list) = value {
            return Some(Shape::CellList(points(list)));
        }

        let shape = match RawBuilding::deserialize(object(value)?).ok()? {
            RawBuilding::Rectangle { x, y, w, h } => Shape::Rectangle {
                origin: Cell::new(x.to_coordinate()?, y.to_coordinate()?),
                width: dimension_or_one(w.as_ref())?,
                height: dimension_or_one(h.as_ref())?,
            },
            RawBuilding::Cells { cells } => Shape::CellList(points(&cells)),
        };
        Some(shape)
    }

    /// Decodes a road entry: a `cells`, `path` or `points` object, a single
    /// `{x, y}` cell, or a bare point list.
    #[must_use]
    pub fn from_road(value: &Value) -> Option<Self> {
        if let Value::Array(list) = value {
            return Some(Shape::Path(points(list)));
        }

        let shape = match RawRoad::deserialize(object(value)?).ok()? {
            RawRoad::Cells { cells } => Shape::CellList(points(&cells)),
            RawRoad::Path { path } => Shape::Path(points(&path)),
            RawRoad::Points { points: list } => Shape::Path(points(&list)),
            RawRoad::Cell { x, y } => {
                Shape::CellList(vec![Cell::new(x.to_coordinate()?, y.to_coordinate()?)])
            }
        };
        Some(shape)
    }

    /// Visits every covered cell that lies inside a `width` x `height` grid.
    pub(crate) fn for_each_clipped<F>(&self, width: u32, height: u32, mut visit: F)
    where
        F: FnMut(usize, usize),
    {
        let inside = |cell: Cell| {
            let x = usize::try_from(cell.x()).ok()?;
            let y = usize::try_from(cell.y()).ok()?;
            (u32::try_from(x).ok()? < width && u32::try_from(y).ok()? < height).then_some((x, y))
        };

        match self {
            Shape::Rectangle {
                origin,
                width: columns,
                height: rows,
            } => {
                let (x_start, x_end) = clip_span(origin.x(), *columns, width);
                let (y_start, y_end) = clip_span(origin.y(), *rows, height);
                for y in y_start..y_end {
                    for x in x_start..x_end {
                        visit(x, y);
                    }
                }
            }
            Shape::CellList(cells) | Shape::Path(cells) => {
                for (x, y) in cells.iter().copied().filter_map(inside) {
                    visit(x, y);
                }
            }
        }
    }
}

fn clip_span(start: i32, length: i32, limit: u32) -> (usize, usize) {
    let start = i64::from(start);
    let end = start + i64::from(length.max(0));
    let clamp = |value: i64| {
        let bounded = value.clamp(0, i64::from(limit));
        usize::try_from(bounded).unwrap_or(0)
    };
    (clamp(start), clamp(end))
}

fn dimension_or_one(value: Option<&Scalar>) -> Option<i32> {
    value.map_or(Some(1), Scalar::to_coordinate)
}

fn points(values: &[Value]) -> Vec<Cell> {
    values.iter().filter_map(point).collect()
}

// Struct-like variants also accept sequences, so arrays are routed away from
// the object layouts before deserializing.
fn object(value: &Value) -> Option<&Value> {
    value.is_object().then_some(value)
}

fn point(value: &Value) -> Option<Cell> {
    let (x, y) = match value {
        Value::Array(items) => match items.as_slice() {
            [x, y, ..] => (Scalar::deserialize(x).ok()?, Scalar::deserialize(y).ok()?),
            _ => return None,
        },
        _ => match RawPoint::deserialize(object(value)?).ok()? {
            RawPoint::Named { x, y } | RawPoint::Grid { col: x, row: y } => (x, y),
        },
    };
    Some(Cell::new(x.to_coordinate()?, y.to_coordinate()?))
}

/// Loosely-typed number: integers, floats (truncated) and numeric strings.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub(crate) fn to_integer(&self) -> Option<i64> {
        match self {
            Scalar::Integer(value) => Some(*value),
            Scalar::Float(value) => float_to_integer(*value),
            Scalar::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(float_to_integer))
            }
        }
    }

    fn to_coordinate(&self) -> Option<i32> {
        let value = self.to_integer()?;
        Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}

fn float_to_integer(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Named { x: Scalar, y: Scalar },
    Grid { col: Scalar, row: Scalar },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBuilding {
    Rectangle {
        x: Scalar,
        y: Scalar,
        #[serde(default, alias = "width")]
        w: Option<Scalar>,
        #[serde(default, alias = "height")]
        h: Option<Scalar>,
    },
    Cells {
        cells: Vec<Value>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoad {
    Cells { cells: Vec<Value> },
    Path { path: Vec<Value> },
    Points { points: Vec<Value> },
    Cell { x: Scalar, y: Scalar },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn covered(shape: &Shape, width: u32, height: u32) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        shape.for_each_clipped(width, height, |x, y| cells.push((x, y)));
        cells
    }

    #[test]
    fn rectangle_building_accepts_long_and_short_size_keys() {
        assert_eq!(
            Shape::from_building(&json!({ "x": 1, "y": 2, "w": 3, "h": 4 })),
            Some(Shape::Rectangle {
                origin: Cell::new(1, 2),
                width: 3,
                height: 4,
            })
        );
        assert_eq!(
            Shape::from_building(&json!({ "x": "1", "y": 2.7, "width": 2 })),
            Some(Shape::Rectangle {
                origin: Cell::new(1, 2),
                width: 2,
                height: 1,
            })
        );
    }

    #[test]
    fn building_cells_accept_mixed_point_layouts() {
        let shape = Shape::from_building(&json!({
            "cells": [{ "x": 0, "y": 1 }, [2, 3], { "col": 4, "row": 5 }, [9], "junk"]
        }));
        assert_eq!(
            shape,
            Some(Shape::CellList(vec![
                Cell::new(0, 1),
                Cell::new(2, 3),
                Cell::new(4, 5),
            ]))
        );
    }

    #[test]
    fn road_layouts_decode_to_expected_variants() {
        assert_eq!(
            Shape::from_road(&json!({ "path": [[0, 0], [1, 0]] })),
            Some(Shape::Path(vec![Cell::new(0, 0), Cell::new(1, 0)]))
        );
        assert_eq!(
            Shape::from_road(&json!({ "points": [{ "col": 2, "row": 2 }] })),
            Some(Shape::Path(vec![Cell::new(2, 2)]))
        );
        assert_eq!(
            Shape::from_road(&json!({ "x": 3, "y": 4 })),
            Some(Shape::CellList(vec![Cell::new(3, 4)]))
        );
        assert_eq!(
            Shape::from_road(&json!([[5, 5], [5, 6]])),
            Some(Shape::Path(vec![Cell::new(5, 5), Cell::new(5, 6)]))
        );
    }

    #[test]
    fn unrecognized_layouts_are_rejected() {
        assert_eq!(Shape::from_building(&json!({ "kind": "tower" })), None);
        assert_eq!(Shape::from_building(&json!("B")), None);
        assert_eq!(Shape::from_road(&json!(42)), None);
        assert_eq!(Shape::from_road(&json!({ "x": "east", "y": 1 })), None);
    }

    #[test]
    fn rectangle_is_clipped_to_grid() {
        let shape = Shape::Rectangle {
            origin: Cell::new(-1, 2),
            width: 3,
            height: 5,
        };
        let cells = covered(&shape, 4, 4);
        assert_eq!(cells, vec![(0, 2), (1, 2), (0, 3), (1, 3)]);
    }

    #[test]
    fn cell_lists_drop_out_of_bounds_cells() {
        let shape = Shape::CellList(vec![Cell::new(-1, 0), Cell::new(1, 1), Cell::new(4, 0)]);
        assert_eq!(covered(&shape, 4, 4), vec![(1, 1)]);
    }

    #[test]
    fn scalar_parses_numeric_text() {
        let scalar = Scalar::Text(" 12 ".to_owned());
        assert_eq!(scalar.to_integer(), Some(12));
        assert_eq!(Scalar::Text("3.9".to_owned()).to_integer(), Some(3));
        assert_eq!(Scalar::Text("abc".to_owned()).to_integer(), None);
        assert_eq!(Scalar::Float(f64::NAN).to_integer(), None);
    }
}
