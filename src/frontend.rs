use std::time::{Duration, Instant};

use crate::error::GameError;
use crate::game::Scene;
use crate::snake::Key;

/// Input events, already translated from whatever device produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Quit,
    /// Anything else; carries no meaning for the game.
    Ignored,
}

/// Abstraction over the drawing surface and the score / message displays.
pub trait Renderer {
    /// Clears the previous frame and draws the scene.
    fn render(&mut self, scene: &Scene<'_>) -> Result<(), GameError>;

    /// Presents the current score.
    fn show_score(&mut self, score: u32) -> Result<(), GameError>;

    /// Shows a message over the board until the next `render`.
    fn show_message(&mut self, lines: &[&str]) -> Result<(), GameError>;
}

/// Abstraction over the device delivering directional input.
pub trait InputSource {
    /// Waits at most `timeout` for one event.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, GameError>;

    /// Blocks until an event arrives.
    fn wait_event(&mut self) -> Result<InputEvent, GameError>;
}

/// Time source for the tick scheduler.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Renderer + ?Sized> Renderer for &mut T {
    fn render(&mut self, scene: &Scene<'_>) -> Result<(), GameError> {
        (**self).render(scene)
    }

    fn show_score(&mut self, score: u32) -> Result<(), GameError> {
        (**self).show_score(score)
    }

    fn show_message(&mut self, lines: &[&str]) -> Result<(), GameError> {
        (**self).show_message(lines)
    }
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, GameError> {
        (**self).poll_event(timeout)
    }

    fn wait_event(&mut self) -> Result<InputEvent, GameError> {
        (**self).wait_event()
    }
}
