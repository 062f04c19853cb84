use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A grid-aligned position. Both coordinates are multiples of the grid unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Raw displacement, no wraparound.
    pub fn offset(self, direction: Direction) -> Cell {
        Cell::new(self.x + direction.x, self.y + direction.y)
    }
}

/// The four directional inputs the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
}

/// Displacement applied to the head each tick, already scaled by the grid unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub x: i32,
    pub y: i32,
}

impl Direction {
    /// Not moving; the state before the first key press.
    pub const ZERO: Direction = Direction { x: 0, y: 0 };

    pub fn for_key(key: Key, unit: i32) -> Self {
        let (x, y) = match key {
            Key::Left => (-unit, 0),
            Key::Up => (0, -unit),
            Key::Right => (unit, 0),
            Key::Down => (0, unit),
        };
        Direction { x, y }
    }

    pub fn is_zero(&self) -> bool {
        *self == Direction::ZERO
    }

    /// A key may only take effect if the axis it moves along is currently idle.
    /// This forbids an immediate reversal but allows any perpendicular turn,
    /// and any first move from standstill.
    pub fn accepts(&self, key: Key) -> bool {
        match key {
            Key::Left | Key::Right => self.x == 0,
            Key::Up | Key::Down => self.y == 0,
        }
    }
}

/// Snake body, head first.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    pub fn new(start: Cell) -> Self {
        Snake { body: VecDeque::from(vec![start]) }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Cell {
        // The body is never empty: it starts with one cell and `advance` pushes before it pops.
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.body.contains(cell)
    }

    /// Pushes the new head and, unless growing, drops the tail.
    /// Returns the vacated tail cell, if any.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Whether the head shares a cell with any other segment.
    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }
}

#[cfg(test)]
impl Snake {
    pub(crate) fn from_cells(cells: &[Cell]) -> Self {
        assert!(!cells.is_empty(), "a snake needs at least one segment");
        Snake { body: cells.iter().copied().collect() }
    }
}
