//! Game tunables. Defaults are the reference configuration: a 400x400 surface,
//! 20-pixel cells, five obstacles and a 100ms tick.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::snake::Cell;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Surface width, a multiple of `grid_unit`.
    pub width: i32,
    /// Surface height, a multiple of `grid_unit`.
    pub height: i32,
    /// Size of one cell and of one movement step.
    pub grid_unit: i32,
    /// Where the one-segment snake starts.
    pub start: Cell,
    pub obstacle_count: usize,
    pub tick_interval_ms: u64,
    /// Random draws tried before falling back to a scan of the free cells.
    pub placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 400,
            height: 400,
            grid_unit: 20,
            start: Cell::new(200, 200),
            obstacle_count: 5,
            tick_interval_ms: 100,
            placement_attempts: 1000,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn columns(&self) -> i32 {
        self.width / self.grid_unit
    }

    pub fn rows(&self) -> i32 {
        self.height / self.grid_unit
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.grid_unit <= 0 {
            return invalid(format!("grid unit must be positive, got {}", self.grid_unit));
        }
        if self.width <= 0 || self.width % self.grid_unit != 0 {
            return invalid(format!(
                "width {} must be a positive multiple of the grid unit {}",
                self.width, self.grid_unit
            ));
        }
        if self.height <= 0 || self.height % self.grid_unit != 0 {
            return invalid(format!(
                "height {} must be a positive multiple of the grid unit {}",
                self.height, self.grid_unit
            ));
        }

        let Cell { x, y } = self.start;
        if x % self.grid_unit != 0 || y % self.grid_unit != 0 {
            return invalid(format!("start ({}, {}) is not aligned to the grid", x, y));
        }
        if !(0..self.width).contains(&x) || !(0..self.height).contains(&y) {
            return invalid(format!("start ({}, {}) lies outside the surface", x, y));
        }

        if self.tick_interval_ms == 0 {
            return invalid("tick interval must be at least 1ms".to_string());
        }
        if self.placement_attempts == 0 {
            return invalid("placement attempts must be at least 1".to_string());
        }

        // One cell for the snake, one for the food.
        let cells = self.columns() as usize * self.rows() as usize;
        if self.obstacle_count.checked_add(2).map_or(true, |needed| needed > cells) {
            return invalid(format!(
                "{} obstacles leave no room for the snake and food on {} cells",
                self.obstacle_count, cells
            ));
        }

        Ok(())
    }
}
