use std::{fs::File, path::Path, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::error::GameError;

const DEFAULT_FILTER: &str = "gridsnake=info";

/// Sends tracing output to `path`. The terminal belongs to the game screen,
/// so nothing is logged to stdout or stderr.
pub fn init(path: &Path) -> Result<(), GameError> {
    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
