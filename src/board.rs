use rand::{seq::SliceRandom, Rng};
use tracing::warn;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::snake::{Cell, Direction};

/// Geometry of the playing surface: `width` x `height`, cut into `unit`-sized cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    unit: i32,
}

impl Board {
    pub fn new(width: i32, height: i32, unit: i32) -> Self {
        Board { width, height, unit }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Board::new(config.width, config.height, config.grid_unit)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn unit(&self) -> i32 {
        self.unit
    }

    pub fn columns(&self) -> i32 {
        self.width / self.unit
    }

    pub fn rows(&self) -> i32 {
        self.height / self.unit
    }

    /// Moves `cell` by `direction`, reappearing on the opposite edge when it
    /// leaves the surface. Each axis wraps independently.
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        let Cell { mut x, mut y } = cell.offset(direction);

        if x < 0 {
            x = self.width - self.unit;
        } else if x >= self.width {
            x = 0;
        }

        if y < 0 {
            y = self.height - self.unit;
        } else if y >= self.height {
            y = 0;
        }

        Cell::new(x, y)
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Cell {
        Cell::new(
            rng.gen_range(0..self.columns()) * self.unit,
            rng.gen_range(0..self.rows()) * self.unit,
        )
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows()).flat_map(move |row| {
            (0..self.columns()).map(move |col| Cell::new(col * self.unit, row * self.unit))
        })
    }

    /// Picks a uniformly random cell for which `occupied` is false.
    ///
    /// Rejection sampling is tried `attempts` times; after that the free cells
    /// are enumerated and one is chosen directly, so a crowded board still
    /// terminates. Fails only when no cell is free.
    pub fn place_random_cell<R, F>(&self, rng: &mut R, attempts: u32, occupied: F) -> Result<Cell, GameError>
    where
        R: Rng,
        F: Fn(&Cell) -> bool,
    {
        for _ in 0..attempts {
            let cell = self.random_cell(rng);
            if !occupied(&cell) {
                return Ok(cell);
            }
        }

        warn!(attempts, "random placement kept hitting occupied cells, scanning free cells");

        let free: Vec<Cell> = self.cells().filter(|cell| !occupied(cell)).collect();
        free.choose(rng).copied().ok_or(GameError::BoardFull {
            columns: self.columns(),
            rows: self.rows(),
        })
    }
}
