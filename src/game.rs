use std::collections::VecDeque;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::snake::{Cell, Direction, Key, Snake};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continuing,
    GameOver(GameOverReason),
}

impl StepOutcome {
    pub fn is_game_over(&self) -> bool {
        matches!(self, StepOutcome::GameOver(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    SelfCollision,
    Obstacle,
    /// Food was eaten but no free cell is left to put the next one on.
    BoardFull,
}

/// Read-only view of everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub snake: &'a VecDeque<Cell>,
    pub food: Cell,
    pub obstacles: &'a [Cell],
    pub width: i32,
    pub height: i32,
    pub unit: i32,
}

/// The whole game state: snake, heading, food, obstacles and score on a
/// wrapping board. Advances one discrete step per `step` call.
pub struct Simulation {
    config: GameConfig,
    board: Board,
    snake: Snake,
    direction: Direction,
    food: Cell,
    obstacles: Vec<Cell>,
    score: u32,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Fails with `GameError::Config` when `config` does not pass `GameConfig::validate`.
    pub fn with_rng(config: &GameConfig, rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;

        let mut sim = Simulation {
            config: config.clone(),
            board: Board::from_config(config),
            snake: Snake::new(config.start),
            direction: Direction::ZERO,
            food: config.start,
            obstacles: Vec::new(),
            score: 0,
            rng,
        };
        sim.populate()?;

        Ok(sim)
    }

    /// Discards the current round and starts a fresh one from the same configuration.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.snake = Snake::new(self.config.start);
        self.direction = Direction::ZERO;
        self.obstacles.clear();
        self.score = 0;
        self.populate()
    }

    fn populate(&mut self) -> Result<(), GameError> {
        // Obstacles go first so the food can avoid them too.
        self.generate_obstacles(self.config.obstacle_count)?;
        self.food = self.place_random_cell()?;

        info!(
            start = ?self.snake.head(),
            food = ?self.food,
            obstacles = self.obstacles.len(),
            "new round"
        );
        Ok(())
    }

    /// A random cell that is neither snake nor obstacle.
    pub fn place_random_cell(&mut self) -> Result<Cell, GameError> {
        let Simulation { board, snake, obstacles, rng, config, .. } = self;

        board.place_random_cell(rng, config.placement_attempts, |cell| {
            snake.contains(cell) || obstacles.contains(cell)
        })
    }

    /// Adds `count` obstacles, each clear of the snake and of the earlier ones.
    pub fn generate_obstacles(&mut self, count: usize) -> Result<(), GameError> {
        for _ in 0..count {
            let cell = self.place_random_cell()?;
            debug!(?cell, "obstacle placed");
            self.obstacles.push(cell);
        }

        Ok(())
    }

    /// Turns the snake unless that would reverse it onto itself.
    pub fn change_direction(&mut self, key: Key) {
        if self.direction.accepts(key) {
            self.direction = Direction::for_key(key, self.board.unit());
            debug!(?key, direction = ?self.direction, "direction changed");
        }
    }

    pub fn step(&mut self) -> StepOutcome {
        if self.direction.is_zero() {
            return StepOutcome::Continuing;
        }

        let new_head = self.board.step(self.snake.head(), self.direction);
        let ate = new_head == self.food;
        self.snake.advance(new_head, ate);

        if ate {
            self.score += 1;
            debug!(score = self.score, at = ?new_head, "food eaten");

            match self.place_random_cell() {
                Ok(cell) => self.food = cell,
                Err(_) => return StepOutcome::GameOver(GameOverReason::BoardFull),
            }
        }

        if self.snake.bites_itself() {
            StepOutcome::GameOver(GameOverReason::SelfCollision)
        } else if self.obstacles.contains(&new_head) {
            StepOutcome::GameOver(GameOverReason::Obstacle)
        } else {
            StepOutcome::Continuing
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            snake: self.snake.body(),
            food: self.food,
            obstacles: &self.obstacles,
            width: self.board.width(),
            height: self.board.height(),
            unit: self.board.unit(),
        }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn head(&self) -> Cell {
        self.snake.head()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn obstacles(&self) -> &[Cell] {
        &self.obstacles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
impl Simulation {
    pub(crate) fn set_food(&mut self, food: Cell) {
        self.food = food;
    }

    pub(crate) fn set_obstacles(&mut self, obstacles: Vec<Cell>) {
        self.obstacles = obstacles;
    }

    pub(crate) fn set_snake(&mut self, cells: &[Cell], direction: Direction) {
        self.snake = Snake::from_cells(cells);
        self.direction = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const RIGHT: Direction = Direction { x: 20, y: 0 };
    const DOWN: Direction = Direction { x: 0, y: 20 };

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn sim_with_seed(seed: u64) -> Simulation {
        Simulation::with_rng(&config(), StdRng::seed_from_u64(seed)).unwrap()
    }

    /// A simulation with no obstacles and the food parked out of the way.
    fn clear_sim() -> Simulation {
        let mut sim = sim_with_seed(42);
        sim.set_obstacles(vec![]);
        sim.set_food(Cell::new(0, 0));
        sim
    }

    fn assert_food_is_free(sim: &Simulation) {
        assert!(!sim.snake().contains(&sim.food()), "food on snake");
        assert!(!sim.obstacles().contains(&sim.food()), "food on obstacle");
    }

    #[test]
    fn starts_idle_with_one_segment() {
        let sim = sim_with_seed(1);
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.head(), Cell::new(200, 200));
        assert_eq!(sim.direction(), Direction::ZERO);
        assert_eq!(sim.score(), 0);
    }

    #[test]
    fn startup_obstacles_are_distinct_and_clear_of_snake() {
        for seed in 0..50 {
            let sim = sim_with_seed(seed);
            let unique: HashSet<Cell> = sim.obstacles().iter().copied().collect();

            assert_eq!(sim.obstacles().len(), 5);
            assert_eq!(unique.len(), 5);
            assert!(!unique.contains(&Cell::new(200, 200)));
            assert_food_is_free(&sim);
        }
    }

    #[test]
    fn obstacle_count_is_tunable() {
        let config = GameConfig { obstacle_count: 17, ..config() };
        let sim = Simulation::with_rng(&config, StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(sim.obstacles().len(), 17);
    }

    #[test]
    fn construction_rejects_a_board_that_cannot_hold_the_obstacles() {
        let config = GameConfig {
            width: 40,
            height: 40,
            start: Cell::new(0, 0),
            obstacle_count: 3,
            ..config()
        };
        let result = Simulation::with_rng(&config, StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(GameError::Config(_))));
    }

    #[test]
    fn construction_rejects_degenerate_geometry() {
        for config in [
            GameConfig { grid_unit: 0, ..config() },
            GameConfig { width: 0, ..config() },
            GameConfig { height: -20, ..config() },
            GameConfig { obstacle_count: usize::MAX, ..config() },
        ] {
            let result = Simulation::with_rng(&config, StdRng::seed_from_u64(0));
            assert!(matches!(result, Err(GameError::Config(_))));
        }
    }

    #[test]
    fn idle_snake_never_moves_or_dies() {
        let mut sim = sim_with_seed(5);
        for _ in 0..100 {
            assert_eq!(sim.step(), StepOutcome::Continuing);
        }
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.head(), Cell::new(200, 200));
    }

    #[test]
    fn first_key_starts_movement_in_any_direction() {
        for (key, expected) in [
            (Key::Left, Cell::new(180, 200)),
            (Key::Up, Cell::new(200, 180)),
            (Key::Right, Cell::new(220, 200)),
            (Key::Down, Cell::new(200, 220)),
        ] {
            let mut sim = clear_sim();
            sim.change_direction(key);
            assert_eq!(sim.step(), StepOutcome::Continuing);
            assert_eq!(sim.head(), expected);
            assert_eq!(sim.snake().len(), 1);
        }
    }

    #[test]
    fn reversal_is_ignored_while_moving() {
        let mut sim = clear_sim();
        sim.change_direction(Key::Right);
        sim.change_direction(Key::Left);
        assert_eq!(sim.direction(), RIGHT);

        sim.change_direction(Key::Down);
        assert_eq!(sim.direction(), DOWN);
        sim.change_direction(Key::Up);
        assert_eq!(sim.direction(), DOWN);
    }

    #[test]
    fn horizontal_axis_stays_locked_until_a_vertical_turn() {
        let mut sim = clear_sim();
        sim.change_direction(Key::Left);

        for key in [Key::Right, Key::Left, Key::Right] {
            sim.change_direction(key);
            assert_eq!(sim.direction().x, -20);
        }

        sim.change_direction(Key::Up);
        assert_eq!(sim.direction().x, 0);
        sim.change_direction(Key::Right);
        assert_eq!(sim.direction(), RIGHT);
    }

    #[test]
    fn moving_keeps_length_and_translates_head() {
        let mut sim = clear_sim();
        sim.set_snake(&[Cell::new(100, 100), Cell::new(80, 100), Cell::new(60, 100)], RIGHT);

        assert_eq!(sim.step(), StepOutcome::Continuing);
        assert_eq!(sim.head(), Cell::new(120, 100));
        assert_eq!(sim.snake().len(), 3);
        assert!(!sim.snake().contains(&Cell::new(60, 100)));
    }

    #[test]
    fn eating_grows_scores_and_relocates_food() {
        let mut sim = sim_with_seed(11);
        sim.set_obstacles(vec![Cell::new(0, 0), Cell::new(20, 0)]);
        sim.set_food(Cell::new(220, 200));
        sim.change_direction(Key::Right);

        assert_eq!(sim.step(), StepOutcome::Continuing);
        assert_eq!(sim.head(), Cell::new(220, 200));
        assert_eq!(sim.score(), 1);
        assert_eq!(sim.snake().len(), 2);
        assert_ne!(sim.food(), Cell::new(220, 200));
        assert_ne!(sim.food(), Cell::new(200, 200));
        assert_food_is_free(&sim);
    }

    #[test]
    fn food_relocation_avoids_everything_over_many_meals() {
        let mut sim = sim_with_seed(23);
        sim.set_obstacles(vec![]);

        // Walk the top row, eating food dropped right in front of the head.
        sim.set_snake(&[Cell::new(0, 0)], RIGHT);
        for i in 1..15 {
            sim.set_food(Cell::new(i * 20, 0));
            assert_eq!(sim.step(), StepOutcome::Continuing);
            assert_eq!(sim.score(), i as u32);
            assert_eq!(sim.snake().len(), i as usize + 1);
            assert_food_is_free(&sim);
        }
    }

    #[test]
    fn wraps_right_edge_to_zero() {
        let mut sim = clear_sim();
        sim.set_snake(&[Cell::new(380, 200)], RIGHT);

        assert_eq!(sim.step(), StepOutcome::Continuing);
        assert_eq!(sim.head(), Cell::new(0, 200));
    }

    #[test]
    fn wraps_top_edge_to_bottom() {
        let mut sim = clear_sim();
        sim.set_snake(&[Cell::new(100, 0)], Direction { x: 0, y: -20 });

        sim.step();
        assert_eq!(sim.head(), Cell::new(100, 380));
    }

    #[test]
    fn running_into_own_body_ends_the_game() {
        let mut sim = clear_sim();
        // Head at (100,100) heading down into a U-shaped body.
        sim.set_snake(
            &[
                Cell::new(100, 100),
                Cell::new(120, 100),
                Cell::new(120, 120),
                Cell::new(100, 120),
                Cell::new(80, 120),
            ],
            DOWN,
        );

        assert_eq!(sim.step(), StepOutcome::GameOver(GameOverReason::SelfCollision));
    }

    #[test]
    fn following_the_vacated_tail_is_safe() {
        let mut sim = clear_sim();
        // A 2x2 loop: the head moves onto the cell the tail leaves this tick.
        sim.set_snake(
            &[
                Cell::new(100, 100),
                Cell::new(120, 100),
                Cell::new(120, 120),
                Cell::new(100, 120),
            ],
            DOWN,
        );

        assert_eq!(sim.step(), StepOutcome::Continuing);
        assert_eq!(sim.head(), Cell::new(100, 120));
    }

    #[test]
    fn running_into_an_obstacle_ends_the_game() {
        let mut sim = clear_sim();
        sim.set_obstacles(vec![Cell::new(220, 200)]);
        sim.change_direction(Key::Right);

        let outcome = sim.step();
        assert!(outcome.is_game_over());
        assert_eq!(outcome, StepOutcome::GameOver(GameOverReason::Obstacle));
    }

    #[test]
    fn eating_the_last_free_cell_reports_board_full() {
        let config = GameConfig {
            width: 40,
            height: 20,
            start: Cell::new(0, 0),
            obstacle_count: 0,
            ..config()
        };
        let mut sim = Simulation::with_rng(&config, StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(sim.food(), Cell::new(20, 0));

        sim.change_direction(Key::Right);
        assert_eq!(sim.step(), StepOutcome::GameOver(GameOverReason::BoardFull));
        assert_eq!(sim.score(), 1);
    }

    #[test]
    fn reset_restores_a_fresh_round() {
        let mut sim = sim_with_seed(8);
        sim.set_obstacles(vec![]);
        sim.set_food(Cell::new(220, 200));
        sim.change_direction(Key::Right);
        sim.step();
        assert_eq!(sim.score(), 1);

        sim.reset().unwrap();
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.head(), Cell::new(200, 200));
        assert_eq!(sim.direction(), Direction::ZERO);
        assert_eq!(sim.obstacles().len(), 5);
        assert_food_is_free(&sim);
    }

    #[test]
    fn scene_mirrors_state() {
        let sim = sim_with_seed(4);
        let scene = sim.scene();

        assert_eq!(scene.snake.len(), 1);
        assert_eq!(scene.food, sim.food());
        assert_eq!(scene.obstacles, sim.obstacles());
        assert_eq!((scene.width, scene.height, scene.unit), (400, 400, 20));
    }
}
