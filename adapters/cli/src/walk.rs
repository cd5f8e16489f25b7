use anyhow::{bail, Result};
use courier_core::{Cell, MovementEvent};
use courier_system_movement::MovementController;
use courier_system_pathfinding::find_path;
use courier_world::Grid;
use tracing::info;

use crate::config::CliConfig;

const MAX_FRAMES_PER_STEP: usize = 100_000;

/// Outcome of walking a token along a planned route.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WalkReport {
    /// Cells of the planned route, start included.
    pub(crate) route: Vec<Cell>,
    /// Every event drained from the controller, in order.
    pub(crate) events: Vec<MovementEvent>,
    /// Cell the token rests on once the walk ends.
    pub(crate) final_cell: Cell,
    /// Number of frames ticked.
    pub(crate) frames: usize,
}

/// Plans a route from `start` to `goal` and confirms every step, ticking the
/// controller at the configured frame time until the plan is exhausted.
pub(crate) fn walk(grid: &Grid, start: Cell, goal: Cell, config: &CliConfig) -> Result<WalkReport> {
    let Some(route) = find_path(grid, start, goal) else {
        bail!(
            "no route from {},{} to {},{}",
            start.x(),
            start.y(),
            goal.x(),
            goal.y()
        );
    };
    info!(steps = route.step_count(), "route planned");

    let mut controller = MovementController::for_terrain(grid, start, config.movement)?;
    controller.plan(route.cells());

    let frame = config.frame();
    let mut events = Vec::new();
    let mut frames = 0;
    while controller.step_once(grid) {
        let mut step_frames = 0;
        while controller.is_moving() {
            if step_frames == MAX_FRAMES_PER_STEP {
                bail!("token did not arrive within {MAX_FRAMES_PER_STEP} frames");
            }
            controller.tick(frame);
            step_frames += 1;
        }
        frames += step_frames;
        events.extend(controller.drain_events());
    }
    events.extend(controller.drain_events());

    Ok(WalkReport {
        route: route.into_cells(),
        events,
        final_cell: controller.cell(),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use courier_world::GridBuilder;
    use serde_json::json;

    use super::*;

    fn grid() -> Grid {
        GridBuilder::new()
            .build(&json!({ "tiles": ["CCC", "BBC", "CCC"] }))
            .expect("builds")
    }

    #[test]
    fn walks_the_whole_route() {
        let report = walk(&grid(), Cell::new(0, 0), Cell::new(0, 2), &CliConfig::default())
            .expect("route exists");

        assert_eq!(report.final_cell, Cell::new(0, 2));
        assert_eq!(report.route.len(), 7);
        let arrivals: Vec<Cell> = report
            .events
            .iter()
            .map(|event| match event {
                MovementEvent::Arrived { cell } => *cell,
                MovementEvent::Blocked { .. } => panic!("unexpected block"),
            })
            .collect();
        assert_eq!(arrivals, report.route[1..].to_vec());
        assert!(report.frames >= 6);
    }

    #[test]
    fn unreachable_goal_is_an_error() {
        let error = walk(&grid(), Cell::new(0, 0), Cell::new(0, 1), &CliConfig::default())
            .expect_err("goal is a building");
        assert!(error.to_string().contains("no route"));
    }
}
