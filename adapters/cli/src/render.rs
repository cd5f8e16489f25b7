use std::collections::{BTreeSet, HashSet};

use courier_core::Cell;
use courier_world::Grid;

const START_MARK: char = '@';
const ROUTE_MARK: char = '*';

/// Draws `grid` as text, one line per row.
///
/// With `flip_y` row 0 is printed first, otherwise last. Cells of `route`
/// are overdrawn, the first one with `@` and the rest with `*`.
pub(crate) fn render_ascii(grid: &Grid, route: Option<&[Cell]>, flip_y: bool) -> String {
    let route = route.unwrap_or_default();
    let start = route.first().copied();
    let marked: HashSet<Cell> = route.iter().copied().collect();

    let mut lines: Vec<String> = grid
        .rows()
        .zip(0..)
        .map(|(row, y)| {
            row.iter()
                .zip(0..)
                .map(|(&symbol, x)| {
                    let cell = Cell::new(x, y);
                    if start == Some(cell) {
                        START_MARK
                    } else if marked.contains(&cell) {
                        ROUTE_MARK
                    } else {
                        symbol
                    }
                })
                .collect()
        })
        .collect();

    if !flip_y {
        lines.reverse();
    }
    lines.join("\n")
}

/// Describes every symbol that occurs in `grid`, one line per symbol in
/// character order: name, walkability, speed factor and hex colour.
pub(crate) fn render_legend(grid: &Grid) -> String {
    let symbols: BTreeSet<char> = grid.rows().flatten().copied().collect();
    symbols
        .into_iter()
        .map(|symbol| {
            let tile = grid.catalog().lookup(symbol);
            let color = tile.color();
            format!(
                "{symbol} {} {} {:.2} #{:02x}{:02x}{:02x}",
                tile.name(),
                if tile.walkable() { "walkable" } else { "blocked" },
                tile.speed_factor(),
                color.red(),
                color.green(),
                color.blue(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use courier_world::GridBuilder;
    use serde_json::json;

    use super::*;

    fn grid() -> Grid {
        GridBuilder::new()
            .build(&json!({ "tiles": ["CCB", "BCC"] }))
            .expect("builds")
    }

    #[test]
    fn flip_controls_row_order() {
        assert_eq!(render_ascii(&grid(), None, true), "CCB\nBCC");
        assert_eq!(render_ascii(&grid(), None, false), "BCC\nCCB");
    }

    #[test]
    fn route_overlay_marks_start_and_steps() {
        let route = [
            Cell::new(0, 0),
            Cell::new(1, 0),
            Cell::new(1, 1),
            Cell::new(2, 1),
        ];
        assert_eq!(render_ascii(&grid(), Some(&route), true), "@*B\nB**");
    }

    #[test]
    fn legend_lists_present_symbols_with_colors() {
        let grid = GridBuilder::new()
            .build(&json!({
                "tiles": ["CBX", "MMC"],
                "legend": { "M": { "name": "Mud", "walkable": true, "speed": 0.5, "color": "#abc" } },
            }))
            .expect("builds");

        assert_eq!(
            render_legend(&grid),
            "B Building blocked 0.00 #654321\n\
             C Street walkable 1.00 #d3d3d3\n\
             M Mud walkable 0.50 #aabbcc\n\
             X Unknown blocked 0.00 #ff0000"
        );
    }
}
