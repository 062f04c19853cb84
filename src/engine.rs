use std::{collections::VecDeque, time::Duration};

use tracing::info;

use crate::error::GameError;
use crate::frontend::{Clock, InputEvent, InputSource, Renderer, SystemClock};
use crate::game::{GameOverReason, Simulation, StepOutcome};
use crate::snake::Key;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The game was lost and the player acknowledged it.
    Restart { score: u32 },
    Quit,
}

/// Drives a `Simulation` at a fixed tick rate, feeding it input from the
/// frontend and drawing every tick.
pub struct GameHost<F, C = SystemClock>
where
    F: Renderer + InputSource,
    C: Clock,
{
    frontend: F,
    clock: C,
    sim: Simulation,
    // Keys received since the last tick, oldest first.
    pending: VecDeque<Key>,
    tick_interval: Duration,
}

impl<F> GameHost<F>
where
    F: Renderer + InputSource,
{
    pub fn new(sim: Simulation, frontend: F) -> Self {
        GameHost::with_clock(sim, frontend, SystemClock)
    }
}

impl<F, C> GameHost<F, C>
where
    F: Renderer + InputSource,
    C: Clock,
{
    pub fn with_clock(sim: Simulation, frontend: F, clock: C) -> Self {
        let tick_interval = sim.config().tick_interval();
        GameHost { frontend, clock, sim, pending: VecDeque::new(), tick_interval }
    }

    /// Shows the controls and waits for a key. Returns false if the player quit.
    pub fn show_intro(&mut self) -> Result<bool, GameError> {
        self.frontend.show_message(&[
            "Arrow keys or WASD to move",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ])?;

        Ok(self.frontend.wait_event()? != InputEvent::Quit)
    }

    /// Plays one round until the snake dies or the player quits.
    pub fn run_session(&mut self) -> Result<SessionEnd, GameError> {
        self.redraw()?;
        info!(tick_ms = self.tick_interval.as_millis() as u64, "session started");

        let mut deadline = self.clock.now() + self.tick_interval;

        let reason = loop {
            let timeout = deadline.saturating_duration_since(self.clock.now());

            match self.frontend.poll_event(timeout)? {
                Some(InputEvent::Key(key)) => {
                    self.pending.push_back(key);
                    continue;
                }
                Some(InputEvent::Quit) => {
                    info!(score = self.sim.score(), "quit during session");
                    return Ok(SessionEnd::Quit);
                }
                Some(InputEvent::Ignored) => continue,
                None => {}
            }

            let now = self.clock.now();
            if now < deadline {
                continue;
            }

            deadline += self.tick_interval;
            if deadline < now {
                // Fell behind; skip the missed ticks instead of bursting.
                deadline = now + self.tick_interval;
            }

            if let StepOutcome::GameOver(reason) = self.tick()? {
                break reason;
            }
        };

        // No tick can fire past this point.
        self.game_over(reason)
    }

    /// Starts a fresh round, dropping any input left from the previous one.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.pending.clear();
        self.sim.reset()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    ///////////////////////////////////////////////////////////////////////////

    fn tick(&mut self) -> Result<StepOutcome, GameError> {
        while let Some(key) = self.pending.pop_front() {
            self.sim.change_direction(key);
        }

        let score = self.sim.score();
        let outcome = self.sim.step();

        self.frontend.render(&self.sim.scene())?;
        if self.sim.score() != score {
            self.frontend.show_score(self.sim.score())?;
        }

        Ok(outcome)
    }

    fn redraw(&mut self) -> Result<(), GameError> {
        self.frontend.render(&self.sim.scene())?;
        self.frontend.show_score(self.sim.score())
    }

    fn game_over(&mut self, reason: GameOverReason) -> Result<SessionEnd, GameError> {
        let score = self.sim.score();
        info!(score, length = self.sim.snake().len(), ?reason, "game over");

        let summary = format!("Game Over! Your score: {}", score);
        self.frontend.show_message(&[
            summary.as_str(),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit.",
        ])?;

        match self.frontend.wait_event()? {
            InputEvent::Quit => Ok(SessionEnd::Quit),
            _ => Ok(SessionEnd::Restart { score }),
        }
    }
}
