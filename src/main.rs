use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use gridsnake::config::GameConfig;
use gridsnake::engine::{GameHost, SessionEnd};
use gridsnake::error::GameError;
use gridsnake::game::Simulation;
use gridsnake::logger;
use gridsnake::term::TermManager;

#[derive(Parser)]
#[command(name = "gridsnake", about = "Snake on a wrapping grid with obstacles")]
struct Args {
    /// YAML file with game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of obstacles, overrides the config file
    #[arg(long)]
    obstacles: Option<usize>,

    /// Milliseconds between ticks, overrides the config file
    #[arg(long)]
    tick_ms: Option<u64>,

    #[arg(long, default_value = "gridsnake.log")]
    log_file: PathBuf,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig, GameError> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(obstacles) = self.obstacles {
            config.obstacle_count = obstacles;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init(&args.log_file)?;

    let config = args.game_config()?;
    info!(?config, "starting");

    let mut term = TermManager::new()?;
    term.fit_board(config.columns(), config.rows())?;

    // The terminal is restored before any error is printed.
    term.run(|term| play(term, &config))?;
    Ok(())
}

fn play(term: &mut TermManager, config: &GameConfig) -> Result<(), GameError> {
    let sim = Simulation::new(config)?;
    let mut host = GameHost::new(sim, term);

    if !host.show_intro()? {
        return Ok(());
    }

    loop {
        match host.run_session()? {
            SessionEnd::Quit => break,
            SessionEnd::Restart { score } => {
                info!(score, "restarting");
                host.reset()?;
            }
        }
    }

    Ok(())
}
