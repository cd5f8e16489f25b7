#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step-confirmed movement of a single token across a walkability grid.
//!
//! A [`MovementController`] is either idle on a cell or moving, interpolating
//! its pixel position toward the centre of an adjacent cell. Steps only start
//! on explicit caller action: [`MovementController::step_once`] advances along
//! a stored plan, [`MovementController::request_adjacent_step`] performs a
//! one-off move. Outcomes that the caller did not request synchronously are
//! queued as [`MovementEvent`] values and drained once per frame.

mod config;
mod pixel;

use std::{mem, time::Duration, vec::Drain};

use courier_core::{Cell, Direction, MovementEvent, StepRejection, Terrain};
use glam::Vec2;
use tracing::{debug, warn};

pub use config::{ConfigError, MovementConfig};
pub use pixel::PixelSpace;

/// Fraction of the tile size used as the token's drawing radius.
const RADIUS_FRACTION: f32 = 0.35;

/// Default token tint as RGB bytes.
pub const TOKEN_COLOR: [u8; 3] = [160, 82, 45];

/// Authoritative state of the movement token.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    cell: Cell,
    pixel: Vec2,
    target_pixel: Vec2,
    moving: bool,
    planned: Vec<Cell>,
    cursor: usize,
}

impl PlayerState {
    /// Discrete cell the token occupies. While moving this is still the cell
    /// the step started from.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Current interpolated pixel position.
    #[must_use]
    pub const fn pixel(&self) -> Vec2 {
        self.pixel
    }

    /// Pixel position the token is heading toward.
    #[must_use]
    pub const fn target_pixel(&self) -> Vec2 {
        self.target_pixel
    }

    /// Whether a step is in progress.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Every cell of the stored plan, including already executed steps.
    #[must_use]
    pub fn planned_path(&self) -> &[Cell] {
        &self.planned
    }

    /// Index of the next unexecuted step within [`Self::planned_path`].
    #[must_use]
    pub const fn next_step_index(&self) -> usize {
        self.cursor
    }

    /// Planned cells that have not been stepped onto yet.
    #[must_use]
    pub fn remaining_steps(&self) -> &[Cell] {
        self.planned.get(self.cursor..).unwrap_or(&[])
    }
}

/// Drives one token through discrete, confirmed steps with pixel
/// interpolation.
#[derive(Clone, Debug)]
pub struct MovementController {
    config: MovementConfig,
    space: PixelSpace,
    state: PlayerState,
    step_speed: f32,
    events: Vec<MovementEvent>,
}

impl MovementController {
    /// Creates an idle controller on `start` for a grid with `rows` rows.
    pub fn new(start: Cell, rows: u32, config: MovementConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let space = PixelSpace::new(config.tile_size, rows, config.flip_y);
        let pixel = space.cell_to_pixel(start);
        Ok(Self {
            config,
            space,
            state: PlayerState {
                cell: start,
                pixel,
                target_pixel: pixel,
                moving: false,
                planned: Vec::new(),
                cursor: 0,
            },
            step_speed: config.pixel_speed,
            events: Vec::new(),
        })
    }

    /// Creates an idle controller on `start`, sized for `terrain`.
    pub fn for_terrain<T>(
        terrain: &T,
        start: Cell,
        config: MovementConfig,
    ) -> Result<Self, ConfigError>
    where
        T: Terrain + ?Sized,
    {
        Self::new(start, terrain.height(), config)
    }

    /// Read-only view of the token state.
    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Discrete cell the token occupies.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.state.cell
    }

    /// Current interpolated pixel position.
    #[must_use]
    pub const fn pixel_position(&self) -> Vec2 {
        self.state.pixel
    }

    /// Whether a step is in progress.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.state.moving
    }

    /// Planned cells that have not been stepped onto yet, for path previews.
    #[must_use]
    pub fn remaining_steps(&self) -> &[Cell] {
        self.state.remaining_steps()
    }

    /// Drawing radius of the token in pixels.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.space.tile_size() * RADIUS_FRACTION
    }

    /// Drawing tint of the token.
    #[must_use]
    pub const fn color(&self) -> [u8; 3] {
        TOKEN_COLOR
    }

    /// Cell/pixel conversion used by the controller.
    #[must_use]
    pub const fn pixel_space(&self) -> &PixelSpace {
        &self.space
    }

    /// Stores `path` for confirmed step-by-step execution.
    ///
    /// A leading cell equal to the current cell is dropped so the plan only
    /// holds upcoming cells. Planning never starts movement.
    pub fn plan(&mut self, path: &[Cell]) {
        let upcoming = match path.split_first() {
            Some((first, rest)) if *first == self.state.cell => rest,
            _ => path,
        };
        self.state.planned = upcoming.to_vec();
        self.state.cursor = 0;
    }

    /// Discards the stored plan.
    pub fn clear_plan(&mut self) {
        self.state.planned.clear();
        self.state.cursor = 0;
    }

    /// Starts the next planned step.
    ///
    /// Returns `false` without touching any state when the plan is empty or
    /// exhausted. A planned cell that cannot be entered queues a
    /// [`MovementEvent::Blocked`] and returns `false`; the cursor stays put so
    /// the caller may replan. Callers should wait for the current step to
    /// finish; a step started mid-move replaces the in-flight target.
    pub fn step_once<T>(&mut self, terrain: &T) -> bool
    where
        T: Terrain + ?Sized,
    {
        let Some(&next) = self.state.planned.get(self.state.cursor) else {
            return false;
        };

        let validation = if self.state.cell.is_adjacent(next) {
            validate_destination(terrain, next)
        } else {
            Err(StepRejection::StepNotAdjacent)
        };
        if let Err(reason) = validation {
            debug!(?next, %reason, "planned step blocked");
            self.events.push(MovementEvent::Blocked { cell: next, reason });
            return false;
        }

        self.begin_step(terrain, next);
        self.state.cursor += 1;
        true
    }

    /// Starts an immediate step to `cell`, bypassing any plan.
    ///
    /// The plan and its cursor are left untouched.
    pub fn request_adjacent_step<T>(&mut self, terrain: &T, cell: Cell) -> Result<(), StepRejection>
    where
        T: Terrain + ?Sized,
    {
        if !self.state.cell.is_adjacent(cell) {
            return Err(StepRejection::NotAdjacent);
        }
        validate_destination(terrain, cell)?;
        self.begin_step(terrain, cell);
        Ok(())
    }

    /// Starts an immediate step one cell in `direction`.
    pub fn request_step<T>(&mut self, terrain: &T, direction: Direction) -> Result<(), StepRejection>
    where
        T: Terrain + ?Sized,
    {
        let target = self.state.cell.step(direction);
        self.request_adjacent_step(terrain, target)
    }

    /// Places the token on `cell` without interpolation, discarding any plan
    /// and any step in progress.
    pub fn teleport(&mut self, cell: Cell) {
        let pixel = self.space.cell_to_pixel(cell);
        self.state.cell = cell;
        self.state.pixel = pixel;
        self.state.target_pixel = pixel;
        self.state.moving = false;
        self.step_speed = self.config.pixel_speed;
        self.clear_plan();
    }

    /// Advances the interpolation by `dt`.
    ///
    /// On arrival the pixel position snaps to the target, the discrete cell is
    /// recomputed from that pixel position, the controller becomes idle and a
    /// [`MovementEvent::Arrived`] is queued.
    pub fn tick(&mut self, dt: Duration) {
        if !self.state.moving {
            return;
        }

        let offset = self.state.target_pixel - self.state.pixel;
        let distance = offset.length();
        let travel = self.step_speed * dt.as_secs_f32();
        if travel >= distance || distance - travel < self.config.arrival_epsilon {
            self.arrive();
        } else {
            self.state.pixel += offset * (travel / distance);
        }
    }

    /// Removes and yields every queued event in the order it occurred.
    pub fn drain_events(&mut self) -> Drain<'_, MovementEvent> {
        self.events.drain(..)
    }

    /// Queued events that have not been drained yet.
    #[must_use]
    pub fn pending_events(&self) -> &[MovementEvent] {
        &self.events
    }

    fn begin_step<T>(&mut self, terrain: &T, cell: Cell)
    where
        T: Terrain + ?Sized,
    {
        if self.state.moving {
            warn!(from = ?self.state.cell, to = ?cell, "step started while already moving");
        }

        self.step_speed = if self.config.scale_by_terrain {
            let factor = terrain.speed_at(cell);
            let factor = if factor.is_finite() && factor > 0.0 {
                factor
            } else {
                1.0
            };
            self.config.pixel_speed * factor
        } else {
            self.config.pixel_speed
        };
        self.state.target_pixel = self.space.cell_to_pixel(cell);
        self.state.moving = true;
    }

    fn arrive(&mut self) {
        self.state.pixel = self.state.target_pixel;
        let previous = mem::replace(
            &mut self.state.cell,
            self.space.pixel_to_cell(self.state.pixel),
        );
        self.state.moving = false;
        debug!(from = ?previous, to = ?self.state.cell, "token arrived");
        self.events.push(MovementEvent::Arrived {
            cell: self.state.cell,
        });
    }
}

fn validate_destination<T>(terrain: &T, cell: Cell) -> Result<(), StepRejection>
where
    T: Terrain + ?Sized,
{
    if !terrain.contains(cell) {
        return Err(StepRejection::OutOfBounds);
    }
    if !terrain.is_walkable(cell) {
        return Err(StepRejection::BlockedByTile);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Strip {
        walkable: Vec<bool>,
    }

    impl Terrain for Strip {
        fn width(&self) -> u32 {
            self.walkable.len() as u32
        }

        fn height(&self) -> u32 {
            1
        }

        fn is_walkable(&self, cell: Cell) -> bool {
            self.index_of(cell)
                .is_some_and(|index| self.walkable[index])
        }

        fn speed_at(&self, cell: Cell) -> f32 {
            if self.is_walkable(cell) {
                2.0
            } else {
                0.0
            }
        }
    }

    fn controller() -> MovementController {
        MovementController::new(Cell::new(0, 0), 1, MovementConfig::default())
            .expect("default config is valid")
    }

    #[test]
    fn plan_drops_current_cell() {
        let mut movement = controller();
        movement.plan(&[Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)]);

        assert_eq!(movement.remaining_steps(), &[Cell::new(1, 0), Cell::new(2, 0)]);
        assert!(!movement.is_moving());
    }

    #[test]
    fn plan_keeps_foreign_first_cell() {
        let mut movement = controller();
        movement.plan(&[Cell::new(1, 0), Cell::new(2, 0)]);
        assert_eq!(movement.state().planned_path().len(), 2);
        assert_eq!(movement.state().next_step_index(), 0);
    }

    #[test]
    fn terrain_scaling_shortens_steps() {
        let strip = Strip {
            walkable: vec![true, true],
        };
        let config = MovementConfig {
            scale_by_terrain: true,
            ..MovementConfig::default()
        };
        let mut movement =
            MovementController::for_terrain(&strip, Cell::new(0, 0), config).expect("valid");
        movement
            .request_adjacent_step(&strip, Cell::new(1, 0))
            .expect("walkable neighbour");

        // 24 px at 280 px/s needs under 0.1 s.
        movement.tick(Duration::from_millis(90));
        assert!(!movement.is_moving());
        assert_eq!(movement.cell(), Cell::new(1, 0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MovementConfig {
            arrival_epsilon: -1.0,
            ..MovementConfig::default()
        };
        assert_eq!(
            MovementController::new(Cell::new(0, 0), 1, config).err(),
            Some(ConfigError::ArrivalEpsilon(-1.0))
        );
    }
}
