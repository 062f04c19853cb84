use crate::error::GameError;
use crate::frontend::{InputEvent, InputSource, Renderer};
use crate::game::Scene;
use crate::snake::{Cell, Key};
use crate::{Coords, TermInt};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use tracing::error;

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};

const SNAKE_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;
const OBSTACLE_COLOR: Color = Color::DarkGrey;

// Terminal characters are roughly twice as tall as wide, so a cell is two columns.
const CHARS_PER_CELL: TermInt = 2;

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    frame: Frame,
    score: u32,
    // Set when something was drawn over the board; the next render repaints everything.
    dirty: bool,
}

/// Where the bordered board sits on screen.
#[derive(Default)]
struct Frame {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self, GameError> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        Ok(TermManager { width, height, stdout, frame: Frame::default(), score: 0, dirty: true })
    }

    /// Centers a `columns` x `rows` board, with its border and the score line below it.
    pub fn fit_board(&mut self, columns: i32, rows: i32) -> Result<(), GameError> {
        let to_term = |n: i32| TermInt::try_from(n).unwrap_or(TermInt::MAX);

        let frame_width = to_term(columns).saturating_mul(CHARS_PER_CELL).saturating_add(2);
        let frame_height = to_term(rows).saturating_add(2);
        let needed = (frame_width, frame_height.saturating_add(1));

        if needed.0 > self.width || needed.1 > self.height {
            return Err(GameError::TerminalTooSmall { needed, available: (self.width, self.height) });
        }

        let top_left = ((self.width - needed.0) / 2, (self.height - needed.1) / 2);
        self.frame = Frame { top_left, width: frame_width, height: frame_height };
        self.dirty = true;
        Ok(())
    }

    pub fn setup(&mut self) -> Result<(), GameError> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(())
    }

    /// Undoes `setup`. Every step is attempted even if an earlier one fails.
    pub fn restore(&mut self) -> Result<(), GameError> {
        let raw = terminal::disable_raw_mode();
        let screen = execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen);
        raw.and(screen)?;
        Ok(())
    }

    /// Runs `f` on the prepared terminal and restores it afterwards, also when
    /// `setup` stopped half way. An error from setup or `f` wins over one from
    /// restoring.
    pub fn run<T, F>(&mut self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut Self) -> Result<T, GameError>,
    {
        let result = self.setup().and_then(|()| f(self));
        let restored = self.restore();
        keep_first_error(result, restored)
    }

    pub fn draw_borders(&mut self) -> Result<(), GameError> {
        let (left, top) = self.frame.top_left;
        let end_x = left + self.frame.width - 1;
        let end_y = top + self.frame.height - 1;

        for x in left..=end_x {
            let ch = if x == left || x == end_x {'+'} else {'-'};
            self.print_at((x, top), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in top + 1..end_y {
            self.print_at((left, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        Ok(())
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<(), GameError> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), GameError> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), GameError> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn repaint_chrome(&mut self) -> Result<(), GameError> {
        self.clear()?;
        self.draw_borders()?;
        self.print_score()?;
        self.dirty = false;
        Ok(())
    }

    fn print_score(&mut self) -> Result<(), GameError> {
        let (left, top) = self.frame.top_left;
        queue!(
            self.stdout,
            cursor::MoveTo(left, top + self.frame.height),
            style::ResetColor,
            style::Print(format!("Score: {}", self.score)),
            terminal::Clear(ClearType::UntilNewLine),
        )?;
        Ok(())
    }
}

impl Renderer for TermManager {
    fn render(&mut self, scene: &Scene<'_>) -> Result<(), GameError> {
        if self.dirty {
            self.repaint_chrome()?;
        }

        let columns = (scene.width / scene.unit) as usize;
        let grid = paint_cells(scene);

        let (left, top) = self.frame.top_left;
        for (row, line) in grid.chunks(columns.max(1)).enumerate() {
            queue!(self.stdout, cursor::MoveTo(left + 1, top + 1 + row as TermInt))?;
            for cell in line {
                let color = cell.unwrap_or(Color::Reset);
                queue!(self.stdout, style::SetBackgroundColor(color), style::Print("  "))?;
            }
        }

        queue!(self.stdout, style::ResetColor)?;
        self.flush()
    }

    fn show_score(&mut self, score: u32) -> Result<(), GameError> {
        self.score = score;
        self.print_score()?;
        self.flush()
    }

    fn show_message(&mut self, lines: &[&str]) -> Result<(), GameError> {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap_or(0) + 2) as TermInt;

        let (left, top) = self.frame.top_left;
        let center = (left + self.frame.width / 2, top + self.frame.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        queue!(self.stdout, style::ResetColor)?;

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            queue!(self.stdout, cursor::MoveTo(top_left.0, y), style::Print(padded_line))?;
        }

        self.dirty = true;
        self.flush()
    }
}

impl InputSource for TermManager {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, GameError> {
        if !poll(timeout)? {
            return Ok(None);
        }

        Ok(Some(match read()? {
            Event::Key(ev) if ev.kind == KeyEventKind::Press => translate_key(&ev),
            _ => InputEvent::Ignored,
        }))
    }

    fn wait_event(&mut self) -> Result<InputEvent, GameError> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    return Ok(translate_key(&ev));
                }
            }
        }
    }
}

/// One colour per board cell, row by row. The snake is painted last so a head
/// that ran into an obstacle stays visible.
fn paint_cells(scene: &Scene<'_>) -> Vec<Option<Color>> {
    let columns = (scene.width / scene.unit) as usize;
    let rows = (scene.height / scene.unit) as usize;
    let mut grid: Vec<Option<Color>> = vec![None; columns * rows];

    let mut paint = |cell: &Cell, color: Color| {
        let (col, row) = ((cell.x / scene.unit) as usize, (cell.y / scene.unit) as usize);
        if col < columns && row < rows {
            grid[row * columns + col] = Some(color);
        }
    };

    paint(&scene.food, FOOD_COLOR);
    for obstacle in scene.obstacles {
        paint(obstacle, OBSTACLE_COLOR);
    }
    for segment in scene.snake {
        paint(segment, SNAKE_COLOR);
    }

    grid
}

fn keep_first_error<T>(result: Result<T, GameError>, cleanup: Result<(), GameError>) -> Result<T, GameError> {
    match (result, cleanup) {
        (Err(err), Err(cleanup_err)) => {
            error!(%cleanup_err, "terminal restore failed");
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(value), cleanup) => cleanup.map(|()| value),
    }
}

fn translate_key(ev: &KeyEvent) -> InputEvent {
    if is_ctrl_c(ev) {
        return InputEvent::Quit;
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => InputEvent::Key(Key::Up),
        KeyCode::Char('a') | KeyCode::Left => InputEvent::Key(Key::Left),
        KeyCode::Char('s') | KeyCode::Down => InputEvent::Key(Key::Down),
        KeyCode::Char('d') | KeyCode::Right => InputEvent::Key(Key::Right),
        _ => InputEvent::Ignored,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
