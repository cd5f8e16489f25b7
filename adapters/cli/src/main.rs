#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a city map payload and drives the courier
//! navigation core.

mod config;
mod render;
mod walk;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use courier_core::{Cell, MovementEvent};
use courier_system_pathfinding::find_path;
use courier_world::{Grid, GridBuilder, Terrain};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "courier", about = "Grid navigation for city map payloads")]
struct Cli {
    /// Optional TOML file with movement and frame settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the grid as text, optionally overlaying a planned route.
    Render {
        /// JSON map payload.
        map: PathBuf,
        /// Route start as `x,y`.
        #[arg(long, value_parser = parse_cell, requires = "to")]
        from: Option<Cell>,
        /// Route goal as `x,y`.
        #[arg(long, value_parser = parse_cell, requires = "from")]
        to: Option<Cell>,
        /// Also prints the properties of every symbol on the map.
        #[arg(long)]
        legend: bool,
    },
    /// Plans a route and walks a token along it one confirmed step at a time.
    Walk {
        /// JSON map payload.
        map: PathBuf,
        /// Start cell as `x,y`; defaults to the grid centre.
        #[arg(long, value_parser = parse_cell)]
        from: Option<Cell>,
        /// Goal cell as `x,y`.
        #[arg(long, value_parser = parse_cell)]
        to: Cell,
    },
}

/// Entry point for the courier command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Render {
            map,
            from,
            to,
            legend,
        } => {
            let grid = load_grid(&map)?;
            let route = match (from, to) {
                (Some(start), Some(goal)) => {
                    let route = find_path(&grid, start, goal);
                    if route.is_none() {
                        warn!(?start, ?goal, "no route to overlay");
                    }
                    route
                }
                _ => None,
            };
            println!("{} ({}x{})", grid.name(), grid.width(), grid.height());
            println!(
                "{}",
                render::render_ascii(
                    &grid,
                    route.as_ref().map(|path| path.cells()),
                    config.movement.flip_y
                )
            );
            if legend {
                println!();
                println!("{}", render::render_legend(&grid));
            }
        }
        Command::Walk { map, from, to } => {
            let grid = load_grid(&map)?;
            let start = from.unwrap_or_else(|| grid.center());
            let report = walk::walk(&grid, start, to, &config)?;
            println!("route of {} steps", report.route.len() - 1);
            for event in &report.events {
                match event {
                    MovementEvent::Arrived { cell } => {
                        println!("arrived {},{}", cell.x(), cell.y());
                    }
                    MovementEvent::Blocked { cell, reason } => {
                        println!("blocked {},{} {reason}", cell.x(), cell.y());
                    }
                }
            }
            println!(
                "at {},{} after {} frames",
                report.final_cell.x(),
                report.final_cell.y(),
                report.frames
            );
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_grid(path: &Path) -> Result<Grid> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read map payload {}", path.display()))?;
    GridBuilder::new()
        .build_from_str(&text)
        .with_context(|| format!("invalid map payload {}", path.display()))
}

fn parse_cell(value: &str) -> Result<Cell, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|error| format!("invalid coordinate `{part}`: {error}"))
    };
    Ok(Cell::new(parse(x)?, parse(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cells() {
        assert_eq!(parse_cell("3,4"), Ok(Cell::new(3, 4)));
        assert_eq!(parse_cell(" -1 , 2"), Ok(Cell::new(-1, 2)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("a,b").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
