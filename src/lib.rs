//! Snake on a wrapping grid: the simulation core, its tick-driven host and a
//! crossterm frontend.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod game;
pub mod logger;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);
