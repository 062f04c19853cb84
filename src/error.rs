use std::{io, path::PathBuf};

use thiserror::Error;

use crate::TermInt;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every cell of the board is taken by the snake or an obstacle.
    #[error("no free cell left on the {columns}x{rows} board")]
    BoardFull { columns: i32, rows: i32 },

    #[error("terminal is {}x{}, the board needs at least {}x{}", .available.0, .available.1, .needed.0, .needed.1)]
    TerminalTooSmall {
        needed: (TermInt, TermInt),
        available: (TermInt, TermInt),
    },
}
